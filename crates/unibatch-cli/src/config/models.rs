use std::path::PathBuf;
use unibatch::engine::config::ScreeningConfig;

/// How to reach the docking executable and where to search.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub executable: PathBuf,
    pub scoring: String,
    pub maps: Option<PathBuf>,
    pub center: Option<[f64; 3]>,
    pub size: Option<[f64; 3]>,
    pub extra_args: Vec<String>,
}

pub struct AppConfig {
    pub receptor: PathBuf,
    pub engine: EngineSettings,
    pub core_config: ScreeningConfig,
}

pub struct PairedAppConfig {
    pub ligand_index: PathBuf,
    pub out_dir: PathBuf,
    pub paired_batch_size: u32,
    pub engine: EngineSettings,
    pub box_size: [f64; 3],
    pub exhaustiveness: u32,
    pub num_modes: u32,
    pub max_step: u32,
    pub refine_step: u32,
    pub seed: u64,
    pub local_only: bool,
    pub device_id: usize,
}
