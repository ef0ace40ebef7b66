use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use unibatch::core::memory::layout::BufferLayout;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSearchConfig {
    pub mode: Option<String>,
    pub exhaustiveness: Option<u32>,
    pub num_modes: Option<u32>,
    pub min_rmsd: Option<f64>,
    pub energy_range: Option<f64>,
    pub max_evals: Option<u32>,
    pub max_step: Option<u32>,
    pub refine_step: Option<u32>,
    pub seed: Option<u64>,
    pub local_only: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSchedulingConfig {
    pub multi_bias: Option<bool>,
    pub max_gpu_memory: Option<u64>,
    pub device_id: Option<usize>,
    pub chunk_limit: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEngineConfig {
    pub executable: Option<PathBuf>,
    pub scoring: Option<String>,
    pub maps: Option<PathBuf>,
    pub center: Option<[f64; 3]>,
    pub size: Option<[f64; 3]>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub search: Option<FileSearchConfig>,
    pub scheduling: Option<FileSchedulingConfig>,
    pub engine: Option<FileEngineConfig>,
    pub bias: Option<PathBuf>,
    /// Replaces the built-in device buffer sizes; every field must be given.
    pub memory_layout: Option<BufferLayout>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
