pub mod chromosome;
pub mod evolution_engine;
pub mod gene;
pub mod history;
pub mod operators;
pub mod population;
pub mod progress;
pub mod selection;

pub use chromosome::{Chromosome, EvalError};
pub use evolution_engine::{EvolutionEngine, RunSummary, StopFlag};
pub use gene::Gene;
pub use history::GenerationHistory;
pub use operators::{MutationOutcome, SkipReason};
pub use progress::{
    ChannelProgressCallback, ConsoleProgressCallback, NoopProgress, ProgressCallback,
    ProgressMessage,
};
