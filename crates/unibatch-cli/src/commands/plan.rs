use super::{ligand_paths, receptor_atoms, resolve_job_budget};
use crate::cli::PlanArgs;
use crate::config::build_screening_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use std::path::Path;
use unibatch::core::io::reader::FileLigandReader;
use unibatch::engine::progress::ProgressReporter;
use unibatch::workflows::{self, screen::PlannedBatch};

pub fn run(args: PlanArgs) -> Result<()> {
    // Planning never writes, so the output directory is irrelevant.
    let app = build_screening_config(&args.job, &Default::default(), Path::new("."))?;
    let config = &app.core_config;

    let paths = ligand_paths(&args.job)?;
    let atoms = receptor_atoms(&app.receptor)?;
    let budget = resolve_job_budget(config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let batches = workflows::screen::plan(
        &paths,
        atoms,
        &FileLigandReader,
        config,
        &budget,
        &reporter,
    )?;

    print!("{}", render_plan(&batches, budget.ceiling_mib, args.list_ligands));
    Ok(())
}

fn render_plan(batches: &[PlannedBatch], ceiling_mib: u64, list_ligands: bool) -> String {
    let mut out = format!("Budget: {} MiB\n", ceiling_mib);
    out.push_str(&format!(
        "{:>6} {:>6} {:>8} {:>14} {:>10} {:>6}\n",
        "batch", "chunk", "ligands", "atom pairs", "pred MiB", "bad"
    ));
    for batch in batches {
        out.push_str(&format!(
            "{:>6} {:>6} {:>8} {:>14} {:>10} {:>6}\n",
            batch.batch_id,
            batch.chunk_index,
            batch.ligands.len(),
            batch.atom_pair_total,
            batch.predicted_mib,
            batch.placeholders
        ));
        if list_ligands {
            for name in &batch.ligands {
                out.push_str(&format!("         {}\n", name));
            }
        }
    }
    let total: usize = batches.iter().map(|b| b.ligands.len()).sum();
    out.push_str(&format!("{} ligand(s) in {} batch(es)\n", total, batches.len()));
    out
}
