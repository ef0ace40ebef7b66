use super::config::ConfigError;
use super::device::DeviceError;
use super::worker::WorkerError;
use crate::core::io::index::IndexFileError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Ligand index error: {source}")]
    Index {
        #[from]
        source: IndexFileError,
    },

    #[error("Device error: {source}")]
    Device {
        #[from]
        source: DeviceError,
    },

    #[error("Output directory '{path}' does not exist or is not a directory")]
    OutputDirectory { path: PathBuf },

    #[error("Failed to open bias file '{path}' for ligand '{ligand}': {source}")]
    BiasFile {
        ligand: PathBuf,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Batch {batch_id} failed during '{stage}': {source}")]
    Worker {
        batch_id: usize,
        stage: &'static str,
        #[source]
        source: WorkerError,
    },

    #[error("Paired batch coordinator failed to prime (status {status})")]
    PairedPrime { status: i32 },
}
