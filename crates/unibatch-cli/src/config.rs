mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_paired_config, build_screening_config};
pub use models::{EngineSettings, PairedAppConfig};
