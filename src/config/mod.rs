pub mod traits;
pub mod evolution;
pub mod functions;
pub mod dataset;
pub mod output;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::{
    CrossoverMode, EvolutionConfig, MatingMode, MutationMode, ReplacementMode, SelectionMode,
};
pub use functions::FunctionSetConfig;
pub use dataset::{AxisRange, DatasetConfig};
pub use output::OutputConfig;
pub use traits::ConfigSection;
