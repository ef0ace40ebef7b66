use std::path::PathBuf;
use thiserror::Error;
use unibatch::core::io::traits::LigandReadError;
use unibatch::engine::error::EngineError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read receptor '{path}': {source}", path = path.display())]
    Receptor {
        path: PathBuf,
        #[source]
        source: LigandReadError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Docking engine exited with status {0}")]
    EngineStatus(i32),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(EngineError::PairedPrime { status }) if *status != 0 => *status,
            CliError::EngineStatus(status) if *status != 0 => *status,
            _ => 1,
        }
    }
}
