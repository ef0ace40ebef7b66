use super::{ligand_paths, receptor_atoms, resolve_job_budget};
use crate::cli::ScreenArgs;
use crate::config::build_screening_config;
use crate::error::Result;
use crate::external::ExternalDockingTemplate;
use crate::utils::progress::CliProgressHandler;
use tracing::{info, warn};
use unibatch::core::io::reader::FileLigandReader;
use unibatch::engine::progress::ProgressReporter;
use unibatch::workflows;

pub fn run(args: ScreenArgs) -> Result<()> {
    let app = build_screening_config(&args.job, &args.engine, &args.out_dir)?;
    let config = &app.core_config;

    let paths = ligand_paths(&args.job)?;
    let atoms = receptor_atoms(&app.receptor)?;
    let budget = resolve_job_budget(config)?;

    let template = ExternalDockingTemplate::new(
        app.engine.clone(),
        app.receptor.clone(),
        atoms,
        config.output.directory.clone(),
        config.scheduling.device_id,
        config.search.energy_range,
        config.scheduling.multi_bias,
        config.receptor_bias.clone(),
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Screening {} ligand(s) within a {} MiB budget...",
        paths.len(),
        budget.ceiling_mib
    );
    info!("Invoking the core screening workflow...");
    let report = workflows::screen::run(
        &paths,
        &template,
        &FileLigandReader,
        config,
        &budget,
        &reporter,
    )?;

    for batch in &report.batches {
        println!(
            "  Batch {:>4} (chunk {}): {:>6} ligand(s), ~{} MiB, {} ms",
            batch.batch_id,
            batch.chunk_index,
            batch.size,
            batch.predicted_mib,
            batch.elapsed.as_millis()
        );
    }
    if report.total_placeholders() > 0 {
        warn!(
            "{} ligand(s) could not be parsed and produced no poses",
            report.total_placeholders()
        );
    }
    println!(
        "Docked {} ligand(s) in {} batch(es), {:.1} s total. Poses written to {}",
        report.total_ligands(),
        report.batches.len(),
        report.elapsed.as_secs_f64(),
        config.output.directory.display()
    );
    Ok(())
}
