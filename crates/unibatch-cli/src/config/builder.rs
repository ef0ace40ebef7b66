use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileEngineConfig};
use super::models::{AppConfig, EngineSettings, PairedAppConfig};
use crate::cli::{EngineArgs, JobArgs, PairedArgs};
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;
use unibatch::engine::config::{ScreeningConfigBuilder, SearchMode};

fn load_file_config(path: Option<&Path>, set_values: &[String]) -> Result<FileConfig> {
    let file_config = match path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, set_values)
}

pub fn build_screening_config(job: &JobArgs, engine: &EngineArgs, out_dir: &Path) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(job.config.as_deref(), &job.set_values)?;

    let search_file = file_config.search.take().unwrap_or_default();
    let sched_file = file_config.scheduling.take().unwrap_or_default();
    let engine_file = file_config.engine.take().unwrap_or_default();

    let search_mode = match job.search_mode.as_deref().or(search_file.mode.as_deref()) {
        Some(name) => SearchMode::from_str(name).map_err(|e| CliError::Config(e.to_string()))?,
        None => defaults.search_mode,
    };

    // A preset chosen on the command line beats explicit values from the file.
    let cli_preset = job.search_mode.is_some();
    let exhaustiveness = job
        .exhaustiveness
        .or(if cli_preset { None } else { search_file.exhaustiveness });
    let max_step = job
        .max_step
        .or(if cli_preset { None } else { search_file.max_step });

    let mut builder = ScreeningConfigBuilder::new()
        .search_mode(search_mode)
        .num_modes(job.num_modes.or(search_file.num_modes).unwrap_or(defaults.num_modes))
        .min_rmsd(job.min_rmsd.or(search_file.min_rmsd).unwrap_or(defaults.min_rmsd))
        .energy_range(
            job.energy_range
                .or(search_file.energy_range)
                .unwrap_or(defaults.energy_range),
        )
        .refine_step(
            job.refine_step
                .or(search_file.refine_step)
                .unwrap_or(defaults.refine_step),
        )
        .seed(job.seed.or(search_file.seed).unwrap_or(defaults.seed))
        .local_only(job.local_only || search_file.local_only.unwrap_or(false))
        .multi_bias(job.multi_bias || sched_file.multi_bias.unwrap_or(false))
        .max_gpu_memory_mib(
            job.max_gpu_memory
                .or(sched_file.max_gpu_memory)
                .unwrap_or(defaults.max_gpu_memory),
        )
        .device_id(job.device_id.or(sched_file.device_id).unwrap_or(defaults.device_id))
        .chunk_limit(
            job.chunk_limit
                .or(sched_file.chunk_limit)
                .unwrap_or(defaults.chunk_limit),
        )
        .output_directory(out_dir.to_path_buf())
        .receptor_bias(job.bias.clone().or(file_config.bias.take()));

    if let Some(value) = exhaustiveness {
        builder = builder.exhaustiveness(value);
    }
    if let Some(value) = max_step {
        builder = builder.max_step(value);
    }
    if let Some(value) = job.max_evals.or(search_file.max_evals) {
        builder = builder.max_evals(value);
    }
    if let Some(layout) = file_config.memory_layout.take() {
        builder = builder.memory_layout(layout);
    }

    let core_config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        receptor: job.receptor.clone(),
        engine: merge_engine(engine, engine_file, &defaults)?,
        core_config,
    })
}

pub fn build_paired_config(args: &PairedArgs) -> Result<PairedAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(args.config.as_deref(), &[])?;
    let search_file = file_config.search.take().unwrap_or_default();
    let sched_file = file_config.scheduling.take().unwrap_or_default();
    let engine_file = file_config.engine.take().unwrap_or_default();

    let engine = merge_engine(&args.engine, engine_file, &defaults)?;
    let box_size = match engine.size {
        Some(size) => size,
        None => {
            warn!(
                "Box size not fully specified for paired docking, using {} Å per side",
                defaults.box_size
            );
            [defaults.box_size; 3]
        }
    };

    let exhaustiveness = args
        .exhaustiveness
        .or(search_file.exhaustiveness)
        .unwrap_or(defaults.paired_exhaustiveness);
    if exhaustiveness == 0 {
        return Err(CliError::Config(
            "Invalid value for 'exhaustiveness': must be at least 1".to_string(),
        ));
    }

    Ok(PairedAppConfig {
        ligand_index: args.ligand_index.clone(),
        out_dir: args.out_dir.clone(),
        paired_batch_size: args.paired_batch_size,
        box_size,
        exhaustiveness,
        num_modes: args.num_modes.or(search_file.num_modes).unwrap_or(defaults.num_modes),
        max_step: args.max_step.or(search_file.max_step).unwrap_or(0),
        refine_step: args
            .refine_step
            .or(search_file.refine_step)
            .unwrap_or(defaults.refine_step),
        seed: args.seed.or(search_file.seed).unwrap_or(defaults.seed),
        local_only: args.local_only || search_file.local_only.unwrap_or(false),
        device_id: args.device_id.or(sched_file.device_id).unwrap_or(defaults.device_id),
        engine,
    })
}

fn triple(name: &str, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Result<Option<[f64; 3]>> {
    match (x, y, z) {
        (Some(x), Some(y), Some(z)) => Ok(Some([x, y, z])),
        (None, None, None) => Ok(None),
        _ => Err(CliError::Argument(format!(
            "--{name}-x, --{name}-y and --{name}-z must be given together"
        ))),
    }
}

fn merge_engine(
    cli: &EngineArgs,
    file: FileEngineConfig,
    defaults: &DefaultsConfig,
) -> Result<EngineSettings> {
    let center = triple("center", cli.center_x, cli.center_y, cli.center_z)?.or(file.center);
    let size = triple("size", cli.size_x, cli.size_y, cli.size_z)?.or(file.size);
    Ok(EngineSettings {
        executable: cli
            .engine
            .clone()
            .or(file.executable)
            .unwrap_or_else(|| PathBuf::from(&defaults.engine_executable)),
        scoring: cli
            .scoring
            .clone()
            .or(file.scoring)
            .unwrap_or_else(|| defaults.scoring.clone()),
        maps: cli.maps.clone().or(file.maps),
        center,
        size,
        extra_args: file.extra_args,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "search.mode" => {
                config.search.get_or_insert_with(Default::default).mode = Some(value_str.to_string());
            }
            "search.exhaustiveness" => {
                config.search.get_or_insert_with(Default::default).exhaustiveness =
                    Some(parse_value(key, value_str)?);
            }
            "search.num-modes" => {
                config.search.get_or_insert_with(Default::default).num_modes =
                    Some(parse_value(key, value_str)?);
            }
            "search.min-rmsd" => {
                config.search.get_or_insert_with(Default::default).min_rmsd =
                    Some(parse_value(key, value_str)?);
            }
            "search.energy-range" => {
                config.search.get_or_insert_with(Default::default).energy_range =
                    Some(parse_value(key, value_str)?);
            }
            "search.max-evals" => {
                config.search.get_or_insert_with(Default::default).max_evals =
                    Some(parse_value(key, value_str)?);
            }
            "search.max-step" => {
                config.search.get_or_insert_with(Default::default).max_step =
                    Some(parse_value(key, value_str)?);
            }
            "search.refine-step" => {
                config.search.get_or_insert_with(Default::default).refine_step =
                    Some(parse_value(key, value_str)?);
            }
            "search.seed" => {
                config.search.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value_str)?);
            }
            "search.local-only" => {
                config.search.get_or_insert_with(Default::default).local_only =
                    Some(parse_value(key, value_str)?);
            }
            "scheduling.multi-bias" => {
                config.scheduling.get_or_insert_with(Default::default).multi_bias =
                    Some(parse_value(key, value_str)?);
            }
            "scheduling.max-gpu-memory" => {
                config.scheduling.get_or_insert_with(Default::default).max_gpu_memory =
                    Some(parse_value(key, value_str)?);
            }
            "scheduling.device-id" => {
                config.scheduling.get_or_insert_with(Default::default).device_id =
                    Some(parse_value(key, value_str)?);
            }
            "scheduling.chunk-limit" => {
                config.scheduling.get_or_insert_with(Default::default).chunk_limit =
                    Some(parse_value(key, value_str)?);
            }
            "engine.executable" => {
                config.engine.get_or_insert_with(Default::default).executable =
                    Some(PathBuf::from(value_str));
            }
            "engine.scoring" => {
                config.engine.get_or_insert_with(Default::default).scoring =
                    Some(value_str.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use unibatch::core::memory::layout::BufferLayout;
    use unibatch::engine::config::DEFAULT_CHUNK_LIMIT;

    fn base_job_args() -> JobArgs {
        JobArgs {
            receptor: PathBuf::from("receptor.pdbqt"),
            ligands: vec![PathBuf::from("a.pdbqt")],
            ligand_index: None,
            config: None,
            search_mode: None,
            exhaustiveness: None,
            num_modes: None,
            min_rmsd: None,
            energy_range: None,
            max_evals: None,
            max_step: None,
            refine_step: None,
            seed: None,
            local_only: false,
            multi_bias: false,
            bias: None,
            max_gpu_memory: None,
            device_id: None,
            chunk_limit: None,
            set_values: vec![],
        }
    }

    fn base_paired_args() -> PairedArgs {
        PairedArgs {
            ligand_index: PathBuf::from("pairs.json"),
            out_dir: PathBuf::from("out"),
            paired_batch_size: 10,
            engine: EngineArgs::default(),
            config: None,
            exhaustiveness: None,
            num_modes: None,
            max_step: None,
            refine_step: None,
            seed: None,
            local_only: false,
            device_id: None,
        }
    }

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_apply_balance_preset() {
        let app =
            build_screening_config(&base_job_args(), &EngineArgs::default(), Path::new("out")).unwrap();
        let cfg = app.core_config;

        assert_eq!(cfg.search.exhaustiveness, 384);
        assert_eq!(cfg.search.max_step, 40);
        assert_eq!(cfg.search.num_modes, 9);
        assert_eq!(cfg.search.refine_step, 3);
        assert_eq!(cfg.scheduling.chunk_limit, DEFAULT_CHUNK_LIMIT);
        assert_eq!(cfg.scheduling.max_gpu_memory_mib, 0);
        assert_eq!(cfg.scheduling.memory_layout, BufferLayout::ENGINE_V1);
        assert_eq!(cfg.output.directory, PathBuf::from("out"));
        assert_eq!(app.engine.executable, PathBuf::from("unidock"));
        assert_eq!(app.engine.scoring, "vina");
    }

    #[test]
    fn file_values_are_merged() {
        let (_dir, path) = write_config(
            r#"
            [search]
            exhaustiveness = 64
            num-modes = 4
            seed = 1234

            [scheduling]
            multi-bias = true
            max-gpu-memory = 6000
            chunk-limit = 250

            [engine]
            executable = "/opt/unidock"
            size = [22.0, 22.0, 22.0]
            "#,
        );
        let mut job = base_job_args();
        job.config = Some(path);

        let app = build_screening_config(&job, &EngineArgs::default(), Path::new("out")).unwrap();
        let cfg = app.core_config;
        assert_eq!(cfg.search.exhaustiveness, 64);
        assert_eq!(cfg.search.max_step, 40);
        assert_eq!(cfg.search.num_modes, 4);
        assert_eq!(cfg.search.seed, 1234);
        assert!(cfg.scheduling.multi_bias);
        assert_eq!(cfg.scheduling.max_gpu_memory_mib, 6000);
        assert_eq!(cfg.scheduling.chunk_limit, 250);
        assert_eq!(app.engine.executable, PathBuf::from("/opt/unidock"));
        assert_eq!(app.engine.size, Some([22.0; 3]));
    }

    #[test]
    fn cli_overrides_file_values() {
        let (_dir, path) = write_config("[search]\nnum-modes = 4\n[scheduling]\ndevice-id = 1\n");
        let mut job = base_job_args();
        job.config = Some(path);
        job.num_modes = Some(12);
        job.device_id = Some(3);
        let engine = EngineArgs {
            center_x: Some(1.0),
            center_y: Some(2.0),
            center_z: Some(-3.0),
            ..EngineArgs::default()
        };

        let app = build_screening_config(&job, &engine, Path::new("out")).unwrap();
        assert_eq!(app.core_config.search.num_modes, 12);
        assert_eq!(app.core_config.scheduling.device_id, 3);
        assert_eq!(app.engine.center, Some([1.0, 2.0, -3.0]));
    }

    #[test]
    fn cli_search_mode_beats_file_exhaustiveness() {
        let (_dir, path) = write_config("[search]\nexhaustiveness = 8\nmax-step = 5\n");
        let mut job = base_job_args();
        job.config = Some(path);
        job.search_mode = Some("fast".to_string());

        let cfg = build_screening_config(&job, &EngineArgs::default(), Path::new("out"))
            .unwrap()
            .core_config;
        assert_eq!(cfg.search.exhaustiveness, 128);
        assert_eq!(cfg.search.max_step, 20);
    }

    #[test]
    fn cli_exhaustiveness_beats_cli_search_mode() {
        let mut job = base_job_args();
        job.search_mode = Some("detail".to_string());
        job.exhaustiveness = Some(16);

        let cfg = build_screening_config(&job, &EngineArgs::default(), Path::new("out"))
            .unwrap()
            .core_config;
        assert_eq!(cfg.search.exhaustiveness, 16);
        assert_eq!(cfg.search.max_step, 40);
    }

    #[test]
    fn set_values_override_file() {
        let (_dir, path) = write_config("[search]\nnum-modes = 4\n");
        let mut job = base_job_args();
        job.config = Some(path);
        job.set_values = vec![
            "search.num-modes=20".to_string(),
            "search.min-rmsd=1.5".to_string(),
            "scheduling.chunk-limit=99".to_string(),
            "search.local-only=true".to_string(),
            "engine.scoring=vinardo".to_string(),
        ];

        let app = build_screening_config(&job, &EngineArgs::default(), Path::new("out")).unwrap();
        assert_eq!(app.core_config.search.num_modes, 20);
        assert!((app.core_config.search.min_rmsd - 1.5).abs() < 1e-12);
        assert_eq!(app.core_config.scheduling.chunk_limit, 99);
        assert!(app.core_config.search.local_only);
        assert_eq!(app.engine.scoring, "vinardo");
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["search.num-modes", "search.num-modes=many", "search.colour=blue"] {
            let mut job = base_job_args();
            job.set_values = vec![bad.to_string()];
            let result = build_screening_config(&job, &EngineArgs::default(), Path::new("out"));
            assert!(matches!(result, Err(CliError::Config(_))), "{bad} accepted");
        }
    }

    #[test]
    fn multi_bias_with_receptor_bias_is_a_config_error() {
        let (_dir, path) = write_config("bias = \"receptor.bpf\"\n");
        let mut job = base_job_args();
        job.config = Some(path);
        job.multi_bias = true;

        let result = build_screening_config(&job, &EngineArgs::default(), Path::new("out"));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_search_mode_is_rejected() {
        let mut job = base_job_args();
        job.search_mode = Some("exhaustive".to_string());
        let result = build_screening_config(&job, &EngineArgs::default(), Path::new("out"));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn partial_center_is_rejected() {
        let engine = EngineArgs {
            center_x: Some(1.0),
            ..EngineArgs::default()
        };
        let result = build_screening_config(&base_job_args(), &engine, Path::new("out"));
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn memory_layout_from_file_reaches_core_config() {
        let (_dir, path) = write_config(
            r#"
            [memory-layout]
            precalc-element = 1
            model = 2
            grid = 3
            ligand-params = 4
            molecule-state = 5
            output = 6
            hessian = 7
            change = 8
            potential = 9
            rng-state = 10
            change-aux-copies = 11
            output-aux-copies = 12
            "#,
        );
        let mut job = base_job_args();
        job.config = Some(path);

        let cfg = build_screening_config(&job, &EngineArgs::default(), Path::new("out"))
            .unwrap()
            .core_config;
        assert_eq!(cfg.scheduling.memory_layout.grid, 3);
        assert_ne!(cfg.scheduling.memory_layout, BufferLayout::ENGINE_V1);
    }

    #[test]
    fn paired_box_defaults_to_25_angstrom() {
        let cfg = build_paired_config(&base_paired_args()).unwrap();
        assert_eq!(cfg.box_size, [25.0; 3]);
        assert_eq!(cfg.exhaustiveness, 8);
        assert_eq!(cfg.paired_batch_size, 10);
    }

    #[test]
    fn paired_box_uses_explicit_size() {
        let mut args = base_paired_args();
        args.engine = EngineArgs {
            size_x: Some(18.0),
            size_y: Some(20.0),
            size_z: Some(22.0),
            ..EngineArgs::default()
        };
        args.exhaustiveness = Some(32);

        let cfg = build_paired_config(&args).unwrap();
        assert_eq!(cfg.box_size, [18.0, 20.0, 22.0]);
        assert_eq!(cfg.exhaustiveness, 32);
    }
}
