use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Uni-Batch Contributors",
    version,
    about = "Uni-Batch CLI - Memory-aware batch scheduling of GPU virtual screening runs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to parse ligands.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dock a ligand library against one receptor, batching ligands to fit device memory.
    Screen(ScreenArgs),
    /// Show how a ligand library would be batched, without docking anything.
    Plan(PlanArgs),
    /// Run one-ligand-one-receptor docking from a paired batch description.
    Paired(PairedArgs),
}

/// Ligand library and scheduling options shared by `screen` and `plan`.
#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("library")
        .required(true)
        .args(["ligands", "ligand_index"]),
))]
pub struct JobArgs {
    /// Rigid receptor file (PDBQT).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub receptor: PathBuf,

    /// Ligand files to dock, in order.
    #[arg(long = "gpu-batch", value_name = "PATH", num_args(1..))]
    pub ligands: Vec<PathBuf>,

    /// Text file listing ligand paths separated by whitespace.
    #[arg(long, value_name = "PATH")]
    pub ligand_index: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Search Overrides ---
    /// Search preset: fast, balance or detail.
    #[arg(long, value_name = "MODE")]
    pub search_mode: Option<String>,

    /// Search replicas per ligand.
    #[arg(short, long, value_name = "INT")]
    pub exhaustiveness: Option<u32>,

    /// Maximum number of binding modes written per ligand.
    #[arg(long, value_name = "INT")]
    pub num_modes: Option<u32>,

    /// Minimum RMSD between output poses.
    #[arg(long, value_name = "FLOAT")]
    pub min_rmsd: Option<f64>,

    /// Maximum energy difference between the best and worst pose written (kcal/mol).
    #[arg(long, value_name = "FLOAT")]
    pub energy_range: Option<f64>,

    /// Evaluations per Monte Carlo run; 0 picks a value from the ligand size.
    #[arg(long, value_name = "INT")]
    pub max_evals: Option<u32>,

    /// Steps per Monte Carlo run; 0 picks a value from the ligand size.
    #[arg(long, value_name = "INT")]
    pub max_step: Option<u32>,

    /// Local refinement steps applied to the best poses.
    #[arg(long, value_name = "INT")]
    pub refine_step: Option<u32>,

    /// Explicit random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Run local optimization only.
    #[arg(long)]
    pub local_only: bool,

    // --- Scheduling Overrides ---
    /// Load a per-ligand bias file (`<ligand>.bpf`) for every ligand.
    #[arg(long, conflicts_with = "bias")]
    pub multi_bias: bool,

    /// Receptor-wide bias file.
    #[arg(long, value_name = "PATH")]
    pub bias: Option<PathBuf>,

    /// Upper bound on device memory used per batch, in MiB (0 uses all available memory).
    #[arg(long, value_name = "MIB")]
    pub max_gpu_memory: Option<u64>,

    /// Device to run on.
    #[arg(long, value_name = "INT")]
    pub device_id: Option<usize>,

    /// Maximum number of ligands parsed and held in host memory at once.
    #[arg(long, value_name = "INT")]
    pub chunk_limit: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.num-modes=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Search box and docking executable options.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Docking executable invoked once per batch.
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// Scoring function passed to the docking executable.
    #[arg(long, value_name = "NAME")]
    pub scoring: Option<String>,

    /// Precomputed affinity maps, used instead of the receptor to build grids.
    #[arg(long, value_name = "PREFIX")]
    pub maps: Option<PathBuf>,

    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub center_x: Option<f64>,
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub center_y: Option<f64>,
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub center_z: Option<f64>,

    #[arg(long, value_name = "FLOAT")]
    pub size_x: Option<f64>,
    #[arg(long, value_name = "FLOAT")]
    pub size_y: Option<f64>,
    #[arg(long, value_name = "FLOAT")]
    pub size_z: Option<f64>,
}

/// Arguments for the `screen` subcommand.
#[derive(Args, Debug)]
pub struct ScreenArgs {
    #[command(flatten)]
    pub job: JobArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Output directory for docked poses. Must exist.
    #[arg(short = 'o', long = "dir", required = true, value_name = "DIR")]
    pub out_dir: PathBuf,
}

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Print every ligand of every batch instead of one line per batch.
    #[arg(long)]
    pub list_ligands: bool,
}

/// Arguments for the `paired` subcommand.
#[derive(Args, Debug)]
pub struct PairedArgs {
    /// Paired batch description (JSON) listing ligand/receptor pairs.
    #[arg(long, required = true, value_name = "PATH")]
    pub ligand_index: PathBuf,

    /// Output directory for docked poses.
    #[arg(short = 'o', long = "dir", required = true, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Pairs docked together per dispatch.
    #[arg(long, value_name = "INT", default_value_t = 10)]
    pub paired_batch_size: u32,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Search replicas per pair.
    #[arg(short, long, value_name = "INT")]
    pub exhaustiveness: Option<u32>,

    /// Maximum number of binding modes written per pair.
    #[arg(long, value_name = "INT")]
    pub num_modes: Option<u32>,

    /// Steps per Monte Carlo run; 0 picks a value from the ligand size.
    #[arg(long, value_name = "INT")]
    pub max_step: Option<u32>,

    /// Local refinement steps applied to the best poses.
    #[arg(long, value_name = "INT")]
    pub refine_step: Option<u32>,

    /// Explicit random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Run local optimization only.
    #[arg(long)]
    pub local_only: bool,

    /// Device to run on.
    #[arg(long, value_name = "INT")]
    pub device_id: Option<usize>,
}
