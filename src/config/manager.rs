use super::{
    dataset::DatasetConfig,
    evolution::EvolutionConfig,
    functions::FunctionSetConfig,
    output::OutputConfig,
    traits::ConfigSection,
};
use crate::error::SymregError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub functions: FunctionSetConfig,
    pub dataset: DatasetConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SymregError> {
        check(&self.evolution)?;
        check(&self.functions)?;
        check(&self.dataset)?;
        check(&self.output)?;
        Ok(())
    }
}

/// Validate one section, naming it in the error.
fn check<S: ConfigSection>(section: &S) -> Result<(), SymregError> {
    section.validate().map_err(|e| match e {
        SymregError::Configuration(msg) => {
            SymregError::Configuration(format!("[{}] {}", S::section_name(), msg))
        }
        other => other,
    })
}

fn parse_like(current: &toml::Value, text: &str) -> Result<toml::Value, SymregError> {
    let invalid = || {
        SymregError::Configuration(format!("'{}' is not a valid {}", text, current.type_str()))
    };
    Ok(match current {
        toml::Value::Integer(_) => toml::Value::Integer(text.parse().map_err(|_| invalid())?),
        toml::Value::Float(_) => toml::Value::Float(text.parse().map_err(|_| invalid())?),
        toml::Value::Boolean(_) => toml::Value::Boolean(text.parse().map_err(|_| invalid())?),
        _ => toml::Value::String(text.to_string()),
    })
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SymregError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SymregError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| SymregError::Configuration(format!("Failed to parse config: {}", e)))?;

        self.replace(config)
    }

    /// Load a config file, then apply `SYMREG__SECTION__FIELD` environment overrides.
    pub fn load_layered<P: AsRef<Path>>(&self, path: P) -> Result<(), SymregError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SYMREG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SymregError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| SymregError::Configuration(format!("Failed to parse config: {}", e)))?;

        self.replace(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SymregError> {
        let config = self.get()?;
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| SymregError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| SymregError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig, SymregError> {
        self.config
            .read()
            .map(|config| config.clone())
            .map_err(|_| SymregError::Configuration("Config lock poisoned".to_string()))
    }

    pub fn update<F>(&self, f: F) -> Result<(), SymregError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut updated = self.get()?;
        f(&mut updated);
        self.replace(updated)
    }

    /// Set one `section.field` from its text form, parsed like its current value.
    pub fn set_field(&self, path: &str, text: &str) -> Result<(), SymregError> {
        let (section, field) = path.split_once('.').ok_or_else(|| {
            SymregError::Configuration(format!("Field '{}' is not section.field", path))
        })?;
        let mut tree = toml::Value::try_from(self.get()?)
            .map_err(|e| SymregError::Configuration(format!("Failed to serialize: {}", e)))?;
        let current = tree
            .get_mut(section)
            .and_then(|s| s.get_mut(field))
            .ok_or_else(|| SymregError::Configuration(format!("Unknown or unset field '{}'", path)))?;
        *current = parse_like(current, text)?;

        let config: AppConfig = tree
            .try_into()
            .map_err(|e| SymregError::Configuration(format!("Invalid value for {}: {}", path, e)))?;
        self.replace(config)
    }

    fn replace(&self, config: AppConfig) -> Result<(), SymregError> {
        config.validate()?;
        let mut guard = self
            .config
            .write()
            .map_err(|_| SymregError::Configuration("Config lock poisoned".to_string()))?;
        *guard = config;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
