pub mod evolution_runner;
pub mod report;

pub use evolution_runner::{EvolutionRunner, RunOutcome};
pub use report::{RunReport, SweepValue};
