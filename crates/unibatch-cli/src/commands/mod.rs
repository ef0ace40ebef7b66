pub mod paired;
pub mod plan;
pub mod screen;

use crate::cli::JobArgs;
use crate::device::NvidiaSmiProbe;
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use unibatch::core::io::index::read_ligand_index;
use unibatch::core::io::pdbqt::PdbqtFile;
use unibatch::core::io::traits::AtomCountFormat;
use unibatch::engine::budget::{ResolvedBudget, resolve_budget};
use unibatch::engine::config::ScreeningConfig;
use unibatch::engine::device::host_memory_bytes;
use unibatch::engine::error::EngineError;

/// Ligand paths in docking order, from `--gpu-batch` or `--ligand-index`.
fn ligand_paths(job: &JobArgs) -> Result<Vec<PathBuf>> {
    if let Some(index) = &job.ligand_index {
        let paths = read_ligand_index(index).map_err(EngineError::from)?;
        info!("Read {} ligand path(s) from {:?}", paths.len(), index);
        return Ok(paths);
    }
    if job.ligands.is_empty() {
        return Err(CliError::Argument(
            "no ligands given: use --gpu-batch or --ligand-index".to_string(),
        ));
    }
    Ok(job.ligands.clone())
}

fn receptor_atoms(receptor: &Path) -> Result<usize> {
    let atoms = PdbqtFile::count_atoms_in_path(receptor).map_err(|source| CliError::Receptor {
        path: receptor.to_path_buf(),
        source,
    })?;
    info!("Receptor {:?} has {} atoms", receptor, atoms);
    Ok(atoms)
}

fn resolve_job_budget(config: &ScreeningConfig) -> Result<ResolvedBudget> {
    let host = host_memory_bytes().unwrap_or_else(|| {
        warn!("Could not determine host memory; batches will only be bounded by --max-gpu-memory");
        0
    });
    let mut probe = NvidiaSmiProbe::detect();
    let budget = resolve_budget(
        host,
        &mut probe,
        config.scheduling.device_id,
        config.scheduling.max_gpu_memory_mib,
    )
    .map_err(EngineError::from)?;
    Ok(budget)
}
