use crate::config::EvolutionConfig;
use crate::engines::generation::evolution_engine::{EvolutionEngine, RunSummary};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// One line of the results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub finished_at: DateTime<Utc>,
    pub stop_reason: String,
    pub iterations: usize,
    pub elapsed_secs: f64,
    pub best_formula: Option<String>,
    pub best_fitness: Option<f64>,
    /// Best individual in population file form, so it can be reloaded
    pub best_genes: Option<String>,
    pub population_size: usize,
    pub displace_skips: usize,
    pub fitness_curve: Vec<f64>,
    pub config: EvolutionConfig,
    /// Swept field and its value, for parameter sweeps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<SweepValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepValue {
    pub field: String,
    pub value: String,
}

impl RunReport {
    pub fn new(engine: &EvolutionEngine, summary: &RunSummary) -> Self {
        Self {
            finished_at: Utc::now(),
            stop_reason: summary.stop_reason.to_string(),
            iterations: summary.iterations,
            elapsed_secs: summary.elapsed.as_secs_f64(),
            best_formula: summary.best.as_ref().map(|b| b.formula().to_string()),
            best_fitness: summary.best.as_ref().map(|b| b.fitness()),
            best_genes: summary.best.as_ref().map(|b| b.write_genes()),
            population_size: summary.population_size,
            displace_skips: summary.displace_skips,
            fitness_curve: engine.history().fitness_curve(),
            config: engine.config().clone(),
            parameter: None,
        }
    }

    pub fn with_parameter(mut self, field: &str, value: &str) -> Self {
        self.parameter = Some(SweepValue {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Append as a single JSON line.
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let line = serde_json::to_string(self)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)?;
        log::info!("Run report appended to {}", path.display());
        Ok(())
    }
}
