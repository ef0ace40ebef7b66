use unibatch::engine::config::{DEFAULT_CHUNK_LIMIT, SearchMode};

pub struct DefaultsConfig {
    pub search_mode: SearchMode,
    pub num_modes: u32,
    pub min_rmsd: f64,
    pub energy_range: f64,
    pub refine_step: u32,
    pub seed: u64,
    pub max_gpu_memory: u64,
    pub device_id: usize,
    pub chunk_limit: usize,
    pub engine_executable: String,
    pub scoring: String,
    pub box_size: f64,
    pub paired_exhaustiveness: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search_mode: SearchMode::Balance,
            num_modes: 9,
            min_rmsd: 1.0,
            energy_range: 3.0,
            refine_step: 3,
            seed: 0,
            max_gpu_memory: 0,
            device_id: 0,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
            engine_executable: "unidock".to_string(),
            scoring: "vina".to_string(),
            box_size: 25.0,
            paired_exhaustiveness: 8,
        }
    }
}
