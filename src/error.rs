use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymregError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed gene sequence: {0}")]
    MalformedGene(String),

    #[error("Malformed population file {path}, line {line}: {reason}")]
    MalformedLine {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Data error: {0}")]
    DataLoading(String),

    #[error("An evolution run is already in progress")]
    AlreadyRunning,

    #[error("No evolution run has been started")]
    NotStarted,

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SymregError>;
