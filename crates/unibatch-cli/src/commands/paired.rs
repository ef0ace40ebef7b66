use crate::cli::PairedArgs;
use crate::config::build_paired_config;
use crate::error::{CliError, Result};
use crate::external::ExternalPairedCoordinator;
use crate::utils::progress::CliProgressHandler;
use tracing::info;
use unibatch::engine::progress::ProgressReporter;
use unibatch::workflows;

pub fn run(args: PairedArgs) -> Result<()> {
    let config = build_paired_config(&args)?;
    let mut coordinator = ExternalPairedCoordinator::new(config);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the paired batch workflow...");
    let outcome = workflows::paired::run(&mut coordinator, &reporter)?;
    println!(
        "Paired batch finished in {:.1} s",
        outcome.elapsed.as_secs_f64()
    );
    if !outcome.succeeded() {
        return Err(CliError::EngineStatus(outcome.status));
    }
    Ok(())
}
