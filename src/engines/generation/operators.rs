use super::chromosome::{branch_end, Chromosome};
use super::gene::Gene;
use crate::config::{CrossoverMode, MutationMode};
use crate::functions::registry::GeneRegistry;
use rand::Rng;

const DISPLACE_ATTEMPTS: usize = 10;

/// Result of a mutation attempt. A skipped mutation leaves the chromosome untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooShort,
    Overlap,
    NoTarget,
}

/// Uniform subtree start and its extent.
fn random_branch<R: Rng>(genes: &[Gene], from: usize, rng: &mut R) -> (usize, usize) {
    let start = rng.gen_range(from..genes.len());
    let end = branch_end(genes, start).unwrap_or(genes.len());
    (start, end)
}

pub fn crossover<R: Rng>(
    mode: CrossoverMode,
    mother: &Chromosome,
    father: &Chromosome,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    match mode {
        CrossoverMode::Middle => crossover_middle(mother, father, rng),
        CrossoverMode::PartialAbsorption => crossover_partial_absorption(mother, father, rng),
        CrossoverMode::TotalAbsorption => crossover_total_absorption(mother, father, rng),
    }
}

/// Classic subtree exchange.
pub fn crossover_middle<R: Rng>(
    mother: &Chromosome,
    father: &Chromosome,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    let (m, f) = (mother.genes(), father.genes());
    let (ms, me) = random_branch(m, 0, rng);
    let (fs, fe) = random_branch(f, 0, rng);

    let child1 = [&m[..ms], &f[fs..fe], &m[me..]].concat();
    let child2 = [&f[..fs], &m[ms..me], &f[fe..]].concat();
    (
        Chromosome::from_valid_genes(child1),
        Chromosome::from_valid_genes(child2),
    )
}

/// Each parent's subtree is wrapped in the other's surrounding tree before
/// being spliced back into its own cut point.
pub fn crossover_partial_absorption<R: Rng>(
    mother: &Chromosome,
    father: &Chromosome,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    let (m, f) = (mother.genes(), father.genes());
    let (ms, me) = random_branch(m, 0, rng);
    let (fs, fe) = random_branch(f, 0, rng);

    let child1 = [&m[..ms], &f[..fs], &m[ms..me], &f[fe..], &m[me..]].concat();
    let child2 = [&f[..fs], &m[..ms], &f[fs..fe], &m[me..], &f[fe..]].concat();
    (
        Chromosome::from_valid_genes(child1),
        Chromosome::from_valid_genes(child2),
    )
}

/// Each parent's whole tree replaces a subtree of the other.
pub fn crossover_total_absorption<R: Rng>(
    mother: &Chromosome,
    father: &Chromosome,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    let (m, f) = (mother.genes(), father.genes());
    let (ms, me) = random_branch(m, 0, rng);
    let (fs, fe) = random_branch(f, 0, rng);

    let child1 = [&m[..ms], f, &m[me..]].concat();
    let child2 = [&f[..fs], m, &f[fe..]].concat();
    (
        Chromosome::from_valid_genes(child1),
        Chromosome::from_valid_genes(child2),
    )
}

pub fn mutate<R: Rng>(
    mode: MutationMode,
    chromosome: &mut Chromosome,
    registry: &GeneRegistry,
    rng: &mut R,
) -> MutationOutcome {
    match mode {
        MutationMode::Replace => mutate_replace(chromosome, registry, rng),
        MutationMode::Swap => mutate_swap(chromosome, rng),
        MutationMode::Displace => mutate_displace(chromosome, rng),
    }
}

/// Redraw one gene, keeping its arity.
pub fn mutate_replace<R: Rng>(
    chromosome: &mut Chromosome,
    registry: &GeneRegistry,
    rng: &mut R,
) -> MutationOutcome {
    let mut genes = chromosome.genes().to_vec();
    let pos = rng.gen_range(0..genes.len());
    let replacement = match genes[pos].arity() {
        0 => Some(registry.random_terminal(rng)),
        1 => registry.random_unary_function(rng),
        _ => registry.random_binary_function(rng),
    };
    if let Some(gene) = replacement {
        genes[pos] = gene;
    }
    chromosome.set_genes(genes);
    MutationOutcome::Applied
}

/// Exchange two disjoint subtrees.
pub fn mutate_swap<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) -> MutationOutcome {
    let genes = chromosome.genes();
    if genes.len() <= 3 {
        return MutationOutcome::Skipped(SkipReason::TooShort);
    }
    let first = random_branch(genes, 1, rng);
    let second = random_branch(genes, 1, rng);
    let (a, b) = if first.0 <= second.0 {
        (first, second)
    } else {
        (second, first)
    };
    if b.0 < a.1 {
        return MutationOutcome::Skipped(SkipReason::Overlap);
    }

    let swapped = [
        &genes[..a.0],
        &genes[b.0..b.1],
        &genes[a.1..b.0],
        &genes[a.0..a.1],
        &genes[b.1..],
    ]
    .concat();
    chromosome.set_genes(swapped);
    MutationOutcome::Applied
}

/// Move a subtree onto a terminal elsewhere in the tree, leaving a `0`
/// constant where it used to be.
pub fn mutate_displace<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) -> MutationOutcome {
    let genes = chromosome.genes();
    if genes.len() <= 2 {
        return MutationOutcome::Skipped(SkipReason::TooShort);
    }
    let (start, end) = random_branch(genes, 1, rng);

    let target = (0..DISPLACE_ATTEMPTS)
        .map(|_| rng.gen_range(0..genes.len()))
        .find(|&pos| (pos < start || pos >= end) && genes[pos].is_terminal());
    let Some(pos) = target else {
        return MutationOutcome::Skipped(SkipReason::NoTarget);
    };

    let branch = &genes[start..end];
    let origin = [Gene::Integer(0)];
    let displaced = if start > pos {
        [
            &genes[..pos],
            branch,
            &genes[pos + 1..start],
            &origin[..],
            &genes[end..],
        ]
        .concat()
    } else {
        [
            &genes[..start],
            &origin[..],
            &genes[end..pos],
            branch,
            &genes[pos + 1..],
        ]
        .concat()
    };
    chromosome.set_genes(displaced);
    MutationOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FunctionSetConfig;
    use crate::engines::generation::chromosome::is_well_formed;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn registry() -> GeneRegistry {
        GeneRegistry::new(&FunctionSetConfig::default()).unwrap()
    }

    fn parse(line: &str) -> Chromosome {
        Chromosome::read_genes(line, &registry()).unwrap()
    }

    #[test]
    fn test_crossovers_keep_children_well_formed() {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(17);
        for mode in [
            CrossoverMode::Middle,
            CrossoverMode::PartialAbsorption,
            CrossoverMode::TotalAbsorption,
        ] {
            for _ in 0..50 {
                let mother = Chromosome::random(&registry, 4, &mut rng);
                let father = Chromosome::random(&registry, 4, &mut rng);
                let (a, b) = crossover(mode, &mother, &father, &mut rng);
                assert!(is_well_formed(a.genes()), "{:?}: {:?}", mode, a.genes());
                assert!(is_well_formed(b.genes()), "{:?}: {:?}", mode, b.genes());
                assert!(a.fitness().is_nan() && b.fitness().is_nan());
            }
        }
    }

    #[test]
    fn test_total_absorption_contains_whole_parent() {
        let mother = parse("+:6;x:2;1:3");
        let father = parse("sin:5;x:2");
        let mut rng = StdRng::seed_from_u64(2);
        let (child1, child2) = crossover_total_absorption(&mother, &father, &mut rng);
        assert!(child1.len() >= father.len());
        assert!(child2.len() >= mother.len());
        assert!(child1.write_genes().contains("sin:5;x:2"));
        assert!(child2.write_genes().contains("+:6;x:2;1:3"));
    }

    #[test]
    fn test_middle_on_terminals_swaps_roots() {
        let mother = parse("x:2");
        let father = parse("4:3");
        let mut rng = StdRng::seed_from_u64(9);
        let (child1, child2) = crossover_middle(&mother, &father, &mut rng);
        assert_eq!(child1.write_genes(), "4:3");
        assert_eq!(child2.write_genes(), "x:2");
    }

    #[test]
    fn test_replace_preserves_arities() {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(5);
        let mut c = parse("*:6;+:6;x:2;sin:5;3:3;x:2");
        for _ in 0..100 {
            let before: Vec<usize> = c.genes().iter().map(Gene::arity).collect();
            assert_eq!(mutate_replace(&mut c, &registry, &mut rng), MutationOutcome::Applied);
            let after: Vec<usize> = c.genes().iter().map(Gene::arity).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_swap_skips_short_chromosomes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut c = parse("+:6;x:2;1:3");
        assert_eq!(
            mutate_swap(&mut c, &mut rng),
            MutationOutcome::Skipped(SkipReason::TooShort)
        );
        assert_eq!(c.write_genes(), "+:6;x:2;1:3");
    }

    #[test]
    fn test_swap_overlap_is_noop() {
        // every subtree starting at >=1 is nested in the one starting at 1
        // except the trailing terminal, so many draws overlap
        let mut rng = StdRng::seed_from_u64(3);
        let original = "+:6;sin:5;cos:5;x:2;2:3";
        let mut skipped = 0;
        for _ in 0..100 {
            let mut c = parse(original);
            match mutate_swap(&mut c, &mut rng) {
                MutationOutcome::Skipped(SkipReason::Overlap) => {
                    skipped += 1;
                    assert_eq!(c.write_genes(), original);
                }
                MutationOutcome::Applied => assert!(is_well_formed(c.genes())),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(skipped > 0);
    }

    #[test]
    fn test_swap_keeps_genes_outside_ranges() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut applied = false;
        for _ in 0..200 {
            let mut c = parse("-:6;sin:5;x:2;3:3");
            if mutate_swap(&mut c, &mut rng) == MutationOutcome::Applied {
                let line = c.write_genes();
                assert!(line == "-:6;3:3;sin:5;x:2" || line == "-:6;sin:5;3:3;x:2", "{}", line);
                applied = true;
            }
        }
        assert!(applied);
    }

    #[test]
    fn test_displace_skips_short_chromosomes() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut c = parse("sin:5;x:2");
        assert_eq!(
            mutate_displace(&mut c, &mut rng),
            MutationOutcome::Skipped(SkipReason::TooShort)
        );
    }

    #[test]
    fn test_displace_without_outside_terminal_has_no_target() {
        let mut rng = StdRng::seed_from_u64(15);
        for _ in 0..20 {
            let mut c = parse("sin:5;sin:5;x:2");
            assert_eq!(
                mutate_displace(&mut c, &mut rng),
                MutationOutcome::Skipped(SkipReason::NoTarget)
            );
            assert_eq!(c.write_genes(), "sin:5;sin:5;x:2");
        }
    }

    #[test]
    fn test_displace_backfills_origin_with_zero() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut applied = 0;
        for _ in 0..100 {
            let mut c = parse("+:6;sin:5;x:2;4:3");
            if mutate_displace(&mut c, &mut rng) == MutationOutcome::Applied {
                applied += 1;
                assert!(is_well_formed(c.genes()));
                assert!(c.genes().contains(&Gene::Integer(0)));
            }
        }
        assert!(applied > 0);
    }

    #[test]
    fn test_mutations_keep_random_trees_well_formed() {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(99);
        for mode in [MutationMode::Replace, MutationMode::Swap, MutationMode::Displace] {
            for _ in 0..100 {
                let mut c = Chromosome::random(&registry, 5, &mut rng);
                mutate(mode, &mut c, &registry, &mut rng);
                assert!(is_well_formed(c.genes()), "{:?}: {:?}", mode, c.genes());
            }
        }
    }
}
