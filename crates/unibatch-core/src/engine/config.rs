use crate::core::memory::layout::BufferLayout;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CHUNK_LIMIT: usize = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },

    #[error("'{0}' cannot be combined with '{1}'")]
    Conflict(&'static str, &'static str),

    #[error("Unknown search mode '{0}' (expected fast, balance or detail)")]
    UnknownSearchMode(String),
}

/// Named search presets, each fixing exhaustiveness and the per-replica step budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    Fast,
    Balance,
    Detail,
}

impl SearchMode {
    pub fn exhaustiveness(self) -> u32 {
        match self {
            SearchMode::Fast => 128,
            SearchMode::Balance => 384,
            SearchMode::Detail => 512,
        }
    }

    pub fn max_step(self) -> u32 {
        match self {
            SearchMode::Fast => 20,
            SearchMode::Balance | SearchMode::Detail => 40,
        }
    }
}

impl FromStr for SearchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(SearchMode::Fast),
            "balance" | "balanced" => Ok(SearchMode::Balance),
            "detail" | "detailed" => Ok(SearchMode::Detail),
            other => Err(ConfigError::UnknownSearchMode(other.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Fast => "fast",
            SearchMode::Balance => "balance",
            SearchMode::Detail => "detail",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub exhaustiveness: u32,
    pub num_modes: u32,
    pub min_rmsd: f64,
    pub energy_range: f64,
    /// Evaluation cap per replica; `0` lets the engine pick from the ligand's size.
    pub max_evals: u32,
    /// Monte Carlo steps per replica; `0` lets the engine pick from the ligand's size.
    pub max_step: u32,
    pub refine_step: u32,
    pub seed: u64,
    pub local_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingConfig {
    pub multi_bias: bool,
    /// User ceiling in MiB; `0` disables the override.
    pub max_gpu_memory_mib: u64,
    pub device_id: usize,
    pub chunk_limit: usize,
    pub memory_layout: BufferLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningConfig {
    pub search: SearchConfig,
    pub scheduling: SchedulingConfig,
    pub output: OutputConfig,
    /// Receptor-wide bias file, applied through the template rather than per batch.
    pub receptor_bias: Option<PathBuf>,
}

#[derive(Default)]
pub struct ScreeningConfigBuilder {
    search_mode: Option<SearchMode>,
    exhaustiveness: Option<u32>,
    num_modes: Option<u32>,
    min_rmsd: Option<f64>,
    energy_range: Option<f64>,
    max_evals: Option<u32>,
    max_step: Option<u32>,
    refine_step: Option<u32>,
    seed: Option<u64>,
    local_only: bool,
    multi_bias: bool,
    max_gpu_memory_mib: Option<u64>,
    device_id: Option<usize>,
    chunk_limit: Option<usize>,
    memory_layout: Option<BufferLayout>,
    output_directory: Option<PathBuf>,
    receptor_bias: Option<PathBuf>,
}

impl ScreeningConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit `exhaustiveness` and `max_step` values take precedence over the preset.
    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = Some(mode);
        self
    }
    pub fn exhaustiveness(mut self, value: u32) -> Self {
        self.exhaustiveness = Some(value);
        self
    }
    pub fn num_modes(mut self, value: u32) -> Self {
        self.num_modes = Some(value);
        self
    }
    pub fn min_rmsd(mut self, value: f64) -> Self {
        self.min_rmsd = Some(value);
        self
    }
    pub fn energy_range(mut self, value: f64) -> Self {
        self.energy_range = Some(value);
        self
    }
    pub fn max_evals(mut self, value: u32) -> Self {
        self.max_evals = Some(value);
        self
    }
    pub fn max_step(mut self, value: u32) -> Self {
        self.max_step = Some(value);
        self
    }
    pub fn refine_step(mut self, value: u32) -> Self {
        self.refine_step = Some(value);
        self
    }
    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }
    pub fn local_only(mut self, enabled: bool) -> Self {
        self.local_only = enabled;
        self
    }
    pub fn multi_bias(mut self, enabled: bool) -> Self {
        self.multi_bias = enabled;
        self
    }
    pub fn max_gpu_memory_mib(mut self, mib: u64) -> Self {
        self.max_gpu_memory_mib = Some(mib);
        self
    }
    pub fn device_id(mut self, id: usize) -> Self {
        self.device_id = Some(id);
        self
    }
    pub fn chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = Some(limit);
        self
    }
    pub fn memory_layout(mut self, layout: BufferLayout) -> Self {
        self.memory_layout = Some(layout);
        self
    }
    pub fn output_directory(mut self, path: PathBuf) -> Self {
        self.output_directory = Some(path);
        self
    }
    pub fn receptor_bias(mut self, path: Option<PathBuf>) -> Self {
        self.receptor_bias = path;
        self
    }

    pub fn build(self) -> Result<ScreeningConfig, ConfigError> {
        let preset = self.search_mode;
        let search = SearchConfig {
            exhaustiveness: self
                .exhaustiveness
                .or(preset.map(SearchMode::exhaustiveness))
                .ok_or(ConfigError::MissingParameter("exhaustiveness"))?,
            num_modes: self
                .num_modes
                .ok_or(ConfigError::MissingParameter("num_modes"))?,
            min_rmsd: self
                .min_rmsd
                .ok_or(ConfigError::MissingParameter("min_rmsd"))?,
            energy_range: self
                .energy_range
                .ok_or(ConfigError::MissingParameter("energy_range"))?,
            max_evals: self.max_evals.unwrap_or(0),
            max_step: self
                .max_step
                .or(preset.map(SearchMode::max_step))
                .unwrap_or(0),
            refine_step: self
                .refine_step
                .ok_or(ConfigError::MissingParameter("refine_step"))?,
            seed: self.seed.ok_or(ConfigError::MissingParameter("seed"))?,
            local_only: self.local_only,
        };
        let scheduling = SchedulingConfig {
            multi_bias: self.multi_bias,
            max_gpu_memory_mib: self.max_gpu_memory_mib.unwrap_or(0),
            device_id: self.device_id.unwrap_or(0),
            chunk_limit: self.chunk_limit.unwrap_or(DEFAULT_CHUNK_LIMIT),
            memory_layout: self.memory_layout.unwrap_or_default(),
        };
        let output = OutputConfig {
            directory: self
                .output_directory
                .ok_or(ConfigError::MissingParameter("output_directory"))?,
        };

        if search.exhaustiveness == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "exhaustiveness",
                reason: "must be at least 1".to_string(),
            });
        }
        if search.num_modes == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "num_modes",
                reason: "must be at least 1".to_string(),
            });
        }
        if scheduling.chunk_limit == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "chunk_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if !search.energy_range.is_finite() || search.energy_range < 0.0 {
            return Err(ConfigError::InvalidValue {
                parameter: "energy_range",
                reason: format!("{} is not a non-negative number", search.energy_range),
            });
        }
        if scheduling.multi_bias && self.receptor_bias.is_some() {
            return Err(ConfigError::Conflict("multi_bias", "receptor_bias"));
        }

        Ok(ScreeningConfig {
            search,
            scheduling,
            output,
            receptor_bias: self.receptor_bias,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> ScreeningConfigBuilder {
        ScreeningConfigBuilder::new()
            .num_modes(9)
            .min_rmsd(1.0)
            .energy_range(3.0)
            .refine_step(3)
            .seed(42)
            .output_directory(PathBuf::from("out"))
    }

    #[test]
    fn preset_fills_exhaustiveness_and_max_step() {
        let config = complete_builder()
            .search_mode(SearchMode::Fast)
            .build()
            .unwrap();
        assert_eq!(config.search.exhaustiveness, 128);
        assert_eq!(config.search.max_step, 20);
    }

    #[test]
    fn explicit_values_override_preset_regardless_of_call_order() {
        let config = complete_builder()
            .exhaustiveness(7)
            .search_mode(SearchMode::Detail)
            .build()
            .unwrap();
        assert_eq!(config.search.exhaustiveness, 7);
        assert_eq!(config.search.max_step, 40);
    }

    #[test]
    fn scheduling_defaults_are_applied() {
        let config = complete_builder().exhaustiveness(8).build().unwrap();
        assert_eq!(config.scheduling.chunk_limit, DEFAULT_CHUNK_LIMIT);
        assert_eq!(config.scheduling.max_gpu_memory_mib, 0);
        assert_eq!(config.scheduling.device_id, 0);
        assert!(!config.scheduling.multi_bias);
        assert_eq!(config.scheduling.memory_layout, BufferLayout::ENGINE_V1);
        assert_eq!(config.search.max_step, 0);
        assert_eq!(config.search.max_evals, 0);
    }

    #[test]
    fn missing_exhaustiveness_without_preset_is_reported() {
        let err = complete_builder().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("exhaustiveness"));
    }

    #[test]
    fn missing_output_directory_is_reported() {
        let err = ScreeningConfigBuilder::new()
            .exhaustiveness(8)
            .num_modes(9)
            .min_rmsd(1.0)
            .energy_range(3.0)
            .refine_step(3)
            .seed(1)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("output_directory"));
    }

    #[test]
    fn zero_chunk_limit_is_rejected() {
        let err = complete_builder()
            .exhaustiveness(8)
            .chunk_limit(0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                parameter: "chunk_limit",
                ..
            }
        ));
    }

    #[test]
    fn zero_exhaustiveness_is_rejected() {
        let err = complete_builder().exhaustiveness(0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                parameter: "exhaustiveness",
                ..
            }
        ));
    }

    #[test]
    fn multi_bias_conflicts_with_receptor_bias() {
        let err = complete_builder()
            .exhaustiveness(8)
            .multi_bias(true)
            .receptor_bias(Some(PathBuf::from("receptor.bpf")))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::Conflict("multi_bias", "receptor_bias"));
    }

    #[test]
    fn search_mode_parses_known_names_case_insensitively() {
        assert_eq!("FAST".parse::<SearchMode>().unwrap(), SearchMode::Fast);
        assert_eq!("balance".parse::<SearchMode>().unwrap(), SearchMode::Balance);
        assert_eq!("detailed".parse::<SearchMode>().unwrap(), SearchMode::Detail);
        assert!(matches!(
            "thorough".parse::<SearchMode>(),
            Err(ConfigError::UnknownSearchMode(_))
        ));
    }
}
