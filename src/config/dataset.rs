use super::traits::ConfigSection;
use crate::error::SymregError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Sampling interval `[min, max)` of one terminal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl AxisRange {
    pub fn points(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.step).ceil().max(0.0) as usize;
        (0..count).map(|i| self.min + i as f64 * self.step).collect()
    }

    fn validate(&self, symbol: &str) -> Result<(), SymregError> {
        if self.step <= 0.0 {
            return Err(SymregError::Configuration(format!(
                "Sampling step of '{}' must be positive",
                symbol
            )));
        }
        if self.max <= self.min {
            return Err(SymregError::Configuration(format!(
                "Range of '{}' must have max greater than min",
                symbol
            )));
        }
        Ok(())
    }
}

/// Where the (input, output) samples come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// `;` separated file, the last column holds the expected output
    pub input_file: Option<PathBuf>,
    pub has_header: bool,
    /// Target expression in population file format, sampled when no file is given
    pub target: String,
    pub x_min: f64,
    pub x_max: f64,
    pub step: f64,
    /// Per-symbol ranges; symbols without one use `x_min`, `x_max` and `step`
    pub ranges: BTreeMap<String, AxisRange>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            input_file: None,
            has_header: false,
            // x**2 + x*sin(x)
            target: "+:6;**:6;x:2;2:3;*:6;x:2;sin:5;x:2".to_string(),
            x_min: 0.0,
            x_max: 10.0,
            step: 0.1,
            ranges: BTreeMap::new(),
        }
    }
}

impl DatasetConfig {
    pub fn axis(&self, symbol: &str) -> AxisRange {
        self.ranges.get(symbol).copied().unwrap_or(AxisRange {
            min: self.x_min,
            max: self.x_max,
            step: self.step,
        })
    }
}

impl ConfigSection for DatasetConfig {
    fn section_name() -> &'static str {
        "dataset"
    }

    fn validate(&self) -> Result<(), SymregError> {
        if self.input_file.is_none() {
            if self.step <= 0.0 {
                return Err(SymregError::Configuration(
                    "Sampling step must be positive".to_string()
                ));
            }
            if self.x_max <= self.x_min {
                return Err(SymregError::Configuration(
                    "x_max must be greater than x_min".to_string()
                ));
            }
            for (symbol, range) in &self.ranges {
                range.validate(symbol)?;
            }
            if self.target.trim().is_empty() {
                return Err(SymregError::Configuration(
                    "A target expression or an input file is required".to_string()
                ));
            }
        }
        Ok(())
    }
}
