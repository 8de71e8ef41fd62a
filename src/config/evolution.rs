use super::traits::ConfigSection;
use crate::error::SymregError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Size of the mating pool drawn from the population each generation
    pub sample_size: usize,
    pub max_depth: usize,
    /// 0 means seed from entropy
    pub seed: u64,
    pub selection: SelectionMode,
    pub mating: MatingMode,
    pub crossover: CrossoverMode,
    pub mutation: MutationMode,
    pub replacement: ReplacementMode,
    /// Probability of discarding a child deeper than `max_depth`
    pub length_tolerance: f64,
    /// A child is mutated when its tolerance draw exceeds this value
    pub mutate_tolerance: f64,
    pub fitness_threshold: f64,
    pub max_iterations: usize,
    pub max_duration_secs: u64,
    /// Read the initial population from this file instead of generating it
    pub population_file: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    Best,
    Worst,
    #[serde(alias = "rand")]
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatingMode {
    Best,
    #[serde(alias = "extrem")]
    Extreme,
    #[serde(alias = "rand")]
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossoverMode {
    #[serde(alias = "swap-middle")]
    Middle,
    #[serde(alias = "absorp-partielle")]
    PartialAbsorption,
    #[serde(alias = "absorp-totale")]
    TotalAbsorption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationMode {
    Replace,
    Swap,
    #[serde(alias = "deplace")]
    Displace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplacementMode {
    #[serde(alias = "child_only")]
    ChildrenOnly,
    #[serde(alias = "child_add")]
    ChildrenAdded,
    #[serde(alias = "mixt_rand")]
    MixedRandom,
    #[serde(alias = "mixt_best")]
    MixedBest,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            sample_size: 75,
            max_depth: 5,
            seed: 123_456_789,
            selection: SelectionMode::Best,
            mating: MatingMode::Extreme,
            crossover: CrossoverMode::Middle,
            mutation: MutationMode::Replace,
            replacement: ReplacementMode::MixedBest,
            length_tolerance: 1.0,
            mutate_tolerance: 0.3,
            fitness_threshold: 0.01,
            max_iterations: 20,
            max_duration_secs: 60 * 60 * 24,
            population_file: None,
            verbose: false,
        }
    }
}

impl EvolutionConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    pub fn seed(&self) -> Option<u64> {
        (self.seed != 0).then_some(self.seed)
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), SymregError> {
        if self.population_size < 2 {
            return Err(SymregError::Configuration(
                "Population size must be at least 2".to_string()
            ));
        }
        if self.sample_size < 2 {
            return Err(SymregError::Configuration(
                "Sample size must be at least 2".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.length_tolerance) {
            return Err(SymregError::Configuration(
                "Length tolerance must be between 0 and 1".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.mutate_tolerance) {
            return Err(SymregError::Configuration(
                "Mutate tolerance must be between 0 and 1".to_string()
            ));
        }
        // sample_size > population_size is clamped by the engine, not rejected
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_oversized_sample_is_accepted() {
        let config = EvolutionConfig {
            population_size: 10,
            sample_size: 500,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tolerance_out_of_range_is_rejected() {
        let config = EvolutionConfig {
            mutate_tolerance: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_seed_means_entropy() {
        let config = EvolutionConfig { seed: 0, ..Default::default() };
        assert_eq!(config.seed(), None);
        assert_eq!(EvolutionConfig::default().seed(), Some(123_456_789));
    }

    #[test]
    fn test_historic_mode_names_deserialize() {
        let config: EvolutionConfig = toml::from_str(
            r#"
            mating = "extrem"
            crossover = "absorp-totale"
            mutation = "deplace"
            replacement = "child_only"
            selection = "rand"
            "#,
        )
        .unwrap();
        assert_eq!(config.mating, MatingMode::Extreme);
        assert_eq!(config.crossover, CrossoverMode::TotalAbsorption);
        assert_eq!(config.mutation, MutationMode::Displace);
        assert_eq!(config.replacement, ReplacementMode::ChildrenOnly);
        assert_eq!(config.selection, SelectionMode::Random);
    }
}
