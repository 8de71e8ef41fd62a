use super::traits::ConfigSection;
use crate::error::SymregError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON lines file the run report is appended to
    pub results_file: Option<PathBuf>,
    /// Population snapshot written once the run halts
    pub population_output: Option<PathBuf>,
    /// Run the generational loop on a background thread
    pub threaded: bool,
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), SymregError> {
        Ok(())
    }
}
