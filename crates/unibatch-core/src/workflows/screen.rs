use crate::core::io::paths;
use crate::core::io::reader::LigandReader;
use crate::core::memory::model::MemoryModel;
use crate::engine::budget::ResolvedBudget;
use crate::engine::chunker::LigandLoadChunker;
use crate::engine::config::ScreeningConfig;
use crate::engine::error::EngineError;
use crate::engine::packer::{Batch, BatchPacker};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::worker::{DockingSession, DockingTemplate, SearchParams, WorkerError};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub chunk_index: usize,
    pub batch_id: usize,
    pub size: usize,
    pub predicted_mib: u64,
    pub placeholders: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreeningReport {
    pub batches: Vec<BatchReport>,
    pub elapsed: Duration,
}

impl ScreeningReport {
    pub fn total_ligands(&self) -> usize {
        self.batches.iter().map(|b| b.size).sum()
    }

    pub fn total_placeholders(&self) -> usize {
        self.batches.iter().map(|b| b.placeholders).sum()
    }
}

/// A batch as it would be dispatched, without dispatching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBatch {
    pub chunk_index: usize,
    pub batch_id: usize,
    pub ligands: Vec<String>,
    pub atom_pair_total: u64,
    pub predicted_mib: u64,
    pub placeholders: usize,
}

fn packer_for(config: &ScreeningConfig, budget: &ResolvedBudget, receptor_atoms: usize) -> BatchPacker {
    BatchPacker::new(
        MemoryModel::new(config.scheduling.memory_layout),
        budget.ceiling_mib,
        config.search.exhaustiveness,
        config.scheduling.multi_bias,
        receptor_atoms,
    )
}

/// Docks every ligand in `ligand_paths`, in order, one batch at a time.
///
/// Any error aborts the whole run. Poses written by batches that completed before the failure
/// stay on disk.
#[instrument(skip_all, name = "screening_workflow", fields(ligands = ligand_paths.len()))]
pub fn run<T, R>(
    ligand_paths: &[PathBuf],
    template: &T,
    reader: &R,
    config: &ScreeningConfig,
    budget: &ResolvedBudget,
    reporter: &ProgressReporter,
) -> Result<ScreeningReport, EngineError>
where
    T: DockingTemplate,
    R: LigandReader + ?Sized,
{
    let out_dir = &config.output.directory;
    if !out_dir.is_dir() {
        return Err(EngineError::OutputDirectory {
            path: out_dir.clone(),
        });
    }

    let started = Instant::now();
    let packer = packer_for(config, budget, template.receptor_atom_count());
    info!(
        budget_mib = packer.budget_mib(),
        receptor_atoms = template.receptor_atom_count(),
        exhaustiveness = config.search.exhaustiveness,
        multi_bias = config.scheduling.multi_bias,
        "Starting screening run"
    );

    reporter.report(Progress::PhaseStart { name: "Screening" });
    let chunks = LigandLoadChunker::new(
        ligand_paths,
        reader,
        config.scheduling.chunk_limit,
        config.scheduling.multi_bias,
        reporter,
    );

    let mut report = ScreeningReport::default();
    for chunk in chunks {
        for batch in packer.pack(chunk) {
            let batch_id = report.batches.len();
            reporter.report(Progress::StatusUpdate {
                text: format!("Docking batch {} ({} ligands)", batch_id, batch.size()),
            });
            let batch_report = dispatch(batch_id, batch, template, config)?;
            reporter.report(Progress::Message(format!(
                "Batch {} running time: {}ms",
                batch_id,
                batch_report.elapsed.as_millis()
            )));
            report.batches.push(batch_report);
        }
    }
    reporter.report(Progress::PhaseFinish);

    report.elapsed = started.elapsed();
    info!(
        batches = report.batches.len(),
        ligands = report.total_ligands(),
        placeholders = report.total_placeholders(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Screening run finished"
    );
    Ok(report)
}

fn worker_error(batch_id: usize, stage: &'static str) -> impl FnOnce(WorkerError) -> EngineError {
    move |source| EngineError::Worker {
        batch_id,
        stage,
        source,
    }
}

#[instrument(skip_all, name = "batch_dispatch", fields(batch_id = batch_id, size = batch.size()))]
fn dispatch<T: DockingTemplate>(
    batch_id: usize,
    batch: Batch,
    template: &T,
    config: &ScreeningConfig,
) -> Result<BatchReport, EngineError> {
    let started = Instant::now();
    let mut session = template.session();

    if config.scheduling.multi_bias {
        // Every bias file is opened before the session sees any of them.
        let mut biases = Vec::with_capacity(batch.size());
        for named in batch.ligands() {
            let source = named.ligand.source();
            let path = named
                .ligand
                .bias_path()
                .map(PathBuf::from)
                .unwrap_or_else(|| paths::bias_path(source));
            let file = File::open(&path).map_err(|e| EngineError::BiasFile {
                ligand: source.to_path_buf(),
                path: path.clone(),
                source: e,
            })?;
            biases.push((source.to_path_buf(), BufReader::new(file)));
        }
        for (source, reader) in biases.iter_mut() {
            session
                .set_batch_bias(source.as_path(), reader)
                .map_err(worker_error(batch_id, "bias"))?;
        }
    }

    let output_paths: Vec<PathBuf> = batch
        .ligands()
        .iter()
        .map(|named| paths::pose_output_path(named.ligand.source(), &config.output.directory))
        .collect();
    let (chunk_index, size, predicted_mib, placeholders) = (
        batch.chunk_index(),
        batch.size(),
        batch.predicted_mib(),
        batch.placeholders(),
    );

    session
        .set_ligands(batch.into_ligands())
        .map_err(worker_error(batch_id, "assignment"))?;
    session
        .search(&SearchParams::for_batch(&config.search, size))
        .map_err(worker_error(batch_id, "search"))?;
    session
        .write_poses(&output_paths, config.search.num_modes, config.search.energy_range)
        .map_err(worker_error(batch_id, "output"))?;

    let elapsed = started.elapsed();
    info!(
        batch_id,
        size,
        predicted_mib,
        elapsed_ms = elapsed.as_millis() as u64,
        "Batch {} running time: {}ms",
        batch_id,
        elapsed.as_millis()
    );

    Ok(BatchReport {
        chunk_index,
        batch_id,
        size,
        predicted_mib,
        placeholders,
        elapsed,
    })
}

/// Loads and packs every ligand exactly as [`run`] would, returning the batches instead of
/// dispatching them.
#[instrument(skip_all, name = "planning_workflow", fields(ligands = ligand_paths.len()))]
pub fn plan<R>(
    ligand_paths: &[PathBuf],
    receptor_atoms: usize,
    reader: &R,
    config: &ScreeningConfig,
    budget: &ResolvedBudget,
    reporter: &ProgressReporter,
) -> Result<Vec<PlannedBatch>, EngineError>
where
    R: LigandReader + ?Sized,
{
    let packer = packer_for(config, budget, receptor_atoms);

    reporter.report(Progress::PhaseStart { name: "Planning" });
    let chunks = LigandLoadChunker::new(
        ligand_paths,
        reader,
        config.scheduling.chunk_limit,
        config.scheduling.multi_bias,
        reporter,
    );

    let mut planned = Vec::new();
    for chunk in chunks {
        for batch in packer.pack(chunk) {
            planned.push(PlannedBatch {
                chunk_index: batch.chunk_index(),
                batch_id: planned.len(),
                atom_pair_total: batch.atom_pair_total(),
                predicted_mib: batch.predicted_mib(),
                placeholders: batch.placeholders(),
                ligands: batch.into_ligands().into_iter().map(|l| l.name).collect(),
            });
        }
    }
    reporter.report(Progress::PhaseFinish);

    info!(batches = planned.len(), "Planned screening run");
    Ok(planned)
}
