//! Collaborator traits implemented by the docking engine.
//!
//! The scheduler never docks anything itself. It prepares a [`DockingTemplate`] once per run
//! (receptor, grid maps, receptor-wide bias) and asks it for a fresh [`DockingSession`] per
//! batch, so no batch can observe another batch's ligands, bias or results.

use super::config::SearchConfig;
use crate::core::models::ligand::NamedLigand;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid bias data from '{path}': {message}")]
    Bias { path: PathBuf, message: String },

    #[error("Ligand assignment rejected: {0}")]
    Assignment(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Failed to write poses: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Search parameters for one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub exhaustiveness: u32,
    pub num_modes: u32,
    pub min_rmsd: f64,
    pub max_evals: u32,
    pub max_step: u32,
    pub batch_size: usize,
    pub seed: u64,
    pub refine_step: u32,
    pub local_only: bool,
}

impl SearchParams {
    pub fn for_batch(search: &SearchConfig, batch_size: usize) -> Self {
        Self {
            exhaustiveness: search.exhaustiveness,
            num_modes: search.num_modes,
            min_rmsd: search.min_rmsd,
            max_evals: search.max_evals,
            max_step: search.max_step,
            batch_size,
            seed: search.seed,
            refine_step: search.refine_step,
            local_only: search.local_only,
        }
    }
}

/// Receptor-level engine state, prepared once and shared read-only by every batch.
pub trait DockingTemplate {
    type Session: DockingSession;

    /// Atom count of the receptor, used for atom-pair accounting.
    fn receptor_atom_count(&self) -> usize;

    /// An independent working copy for one batch.
    fn session(&self) -> Self::Session;
}

/// Per-batch working copy of the engine. Consumed by exactly one batch.
pub trait DockingSession {
    /// Loads the bias grid of one ligand. Called once per ligand, in batch order, before
    /// [`DockingSession::set_ligands`].
    fn set_batch_bias(&mut self, ligand: &Path, bias: &mut dyn BufRead) -> Result<(), WorkerError>;

    fn set_ligands(&mut self, ligands: Vec<NamedLigand>) -> Result<(), WorkerError>;

    fn search(&mut self, params: &SearchParams) -> Result<(), WorkerError>;

    /// Writes up to `num_modes` poses per ligand within `energy_range` of the best, one file per
    /// ligand, in the order the ligands were assigned.
    fn write_poses(
        &mut self,
        output_paths: &[PathBuf],
        num_modes: u32,
        energy_range: f64,
    ) -> Result<(), WorkerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_carry_config_and_batch_size() {
        let search = SearchConfig {
            exhaustiveness: 384,
            num_modes: 9,
            min_rmsd: 1.0,
            energy_range: 3.0,
            max_evals: 0,
            max_step: 40,
            refine_step: 3,
            seed: 7,
            local_only: false,
        };
        let params = SearchParams::for_batch(&search, 12);
        assert_eq!(params.batch_size, 12);
        assert_eq!(params.exhaustiveness, 384);
        assert_eq!(params.max_step, 40);
        assert_eq!(params.seed, 7);
        assert!(!params.local_only);
    }
}
