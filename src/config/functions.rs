use super::traits::ConfigSection;
use crate::error::SymregError;
use crate::functions::primitives;
use serde::{Deserialize, Serialize};

/// Function and terminal sets the registry is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionSetConfig {
    pub unary: Vec<String>,
    pub binary: Vec<String>,
    pub terminals: Vec<String>,
    /// Integer constants are drawn from `[-max_constant, max_constant]`
    pub max_constant: i64,
}

impl Default for FunctionSetConfig {
    fn default() -> Self {
        Self {
            unary: primitives::aliases_with_arity(1),
            binary: primitives::aliases_with_arity(2),
            terminals: vec!["x".to_string()],
            max_constant: 10,
        }
    }
}

impl FunctionSetConfig {
    /// Same terminals and constants, every catalog function enabled.
    pub fn with_full_catalog(&self) -> Self {
        Self {
            unary: primitives::aliases_with_arity(1),
            binary: primitives::aliases_with_arity(2),
            ..self.clone()
        }
    }
}

impl ConfigSection for FunctionSetConfig {
    fn section_name() -> &'static str {
        "functions"
    }

    fn validate(&self) -> Result<(), SymregError> {
        if self.terminals.is_empty() {
            return Err(SymregError::Configuration(
                "At least one terminal symbol is required".to_string()
            ));
        }
        if self.unary.is_empty() && self.binary.is_empty() {
            return Err(SymregError::Configuration(
                "At least one function is required".to_string()
            ));
        }
        if self.max_constant < 0 {
            return Err(SymregError::Configuration(
                "Constant bound must not be negative".to_string()
            ));
        }
        for (names, arity) in [(&self.unary, 1), (&self.binary, 2)] {
            for name in names {
                match primitives::lookup(name) {
                    Some(f) if f.arity() == arity => {}
                    Some(_) => {
                        return Err(SymregError::Configuration(format!(
                            "Function '{}' does not take {} argument(s)",
                            name, arity
                        )))
                    }
                    None => {
                        return Err(SymregError::Configuration(format!(
                            "Unknown function '{}'",
                            name
                        )))
                    }
                }
            }
        }
        Ok(())
    }
}
