//! Population files: one chromosome per line in `value:kind;...` form.

use super::chromosome::Chromosome;
use crate::data::SampleSet;
use crate::error::{Result, SymregError};
use crate::functions::registry::GeneRegistry;
use rayon::prelude::*;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Parse every non-blank line, then score them in parallel.
///
/// A line that does not parse aborts the load. Lines that parse but cannot be
/// scored are dropped.
pub fn read_population(
    path: &Path,
    registry: &GeneRegistry,
    samples: &SampleSet,
) -> Result<Vec<Chromosome>> {
    let contents = fs::read_to_string(path)?;

    let mut parsed = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let chromosome = Chromosome::read_genes(line, registry).map_err(|e| {
            SymregError::MalformedLine {
                path: path.display().to_string(),
                line: index + 1,
                reason: e.to_string(),
            }
        })?;
        parsed.push(chromosome);
    }

    let total = parsed.len();
    let population: Vec<Chromosome> = parsed
        .into_par_iter()
        .filter_map(|mut c| c.calculate_fitness(samples).ok().map(|_| c))
        .collect();

    if population.len() < total {
        log::info!(
            "Dropped {} of {} chromosomes from {} with invalid fitness",
            total - population.len(),
            total,
            path.display()
        );
    }
    Ok(population)
}

pub fn write_population(path: &Path, population: &[Chromosome]) -> Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for chromosome in population {
        writeln!(writer, "{}", chromosome.write_genes())?;
    }
    writer.flush()?;
    log::info!("Wrote {} chromosomes to {}", population.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FunctionSetConfig;

    fn setup() -> (GeneRegistry, SampleSet) {
        let registry = GeneRegistry::new(&FunctionSetConfig::default()).unwrap();
        let samples = SampleSet::from_scalars(&[0.5, 1.0, 2.0], &[0.5, 1.0, 2.0]).unwrap();
        (registry, samples)
    }

    #[test]
    fn test_blank_and_invalid_lines() {
        let (registry, samples) = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.txt");
        // ln(x - 1) is undefined at 0.5
        fs::write(&path, "x:2\n\n   \nln:5;-:6;x:2;1:3\n+:6;x:2;0:3\n").unwrap();

        let population = read_population(&path, &registry, &samples).unwrap();
        assert_eq!(population.len(), 2);
        assert!(population.iter().all(|c| c.fitness() == 0.0));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let (registry, samples) = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.txt");
        fs::write(&path, "x:2\n\nx\n").unwrap();

        match read_population(&path, &registry, &samples) {
            Err(SymregError::MalformedLine { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected malformed line, got {:?}", other.map(|p| p.len())),
        }
    }

    #[test]
    fn test_snapshot_reloads() {
        let (registry, samples) = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.txt");
        let original = vec![
            Chromosome::read_genes("*:6;x:2;1:3", &registry).unwrap(),
            Chromosome::read_genes("sin:5;x:2", &registry).unwrap(),
        ];
        write_population(&path, &original).unwrap();

        let reloaded = read_population(&path, &registry, &samples).unwrap();
        let lines: Vec<String> = reloaded.iter().map(Chromosome::write_genes).collect();
        assert_eq!(lines, vec!["*:6;x:2;1:3", "sin:5;x:2"]);
    }
}
