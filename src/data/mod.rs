pub mod csv;
pub mod samples;

pub use csv::{load_samples, CsvConnector};
pub use samples::SampleSet;
