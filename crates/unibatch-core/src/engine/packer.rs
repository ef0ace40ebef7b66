use super::chunker::LoadChunk;
use crate::core::memory::model::MemoryModel;
use crate::core::models::ligand::{Ligand, NamedLigand};
use tracing::{debug, warn};

/// Position and predicted footprint of one batch within a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchShape {
    pub start: usize,
    pub len: usize,
    pub atom_pair_total: u64,
    pub predicted_mib: u64,
}

impl BatchShape {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// A contiguous run of ligands dispatched together.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    chunk_index: usize,
    shape: BatchShape,
    ligands: Vec<NamedLigand>,
}

impl Batch {
    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn size(&self) -> usize {
        self.ligands.len()
    }

    pub fn ligands(&self) -> &[NamedLigand] {
        &self.ligands
    }

    pub fn into_ligands(self) -> Vec<NamedLigand> {
        self.ligands
    }

    pub fn atom_pair_total(&self) -> u64 {
        self.shape.atom_pair_total
    }

    pub fn predicted_mib(&self) -> u64 {
        self.shape.predicted_mib
    }

    pub fn placeholders(&self) -> usize {
        self.ligands.iter().filter(|l| l.ligand.is_placeholder()).count()
    }
}

/// Greedy, order-preserving packer.
///
/// Walks ligands in order and grows the open batch while the predicted footprint of the
/// batch including the candidate stays strictly below the budget. The first ligand of a batch
/// is always admitted, so a ligand that alone exceeds the budget runs as a batch of one instead
/// of stalling the run.
#[derive(Debug, Clone, Copy)]
pub struct BatchPacker {
    model: MemoryModel,
    budget_mib: u64,
    exhaustiveness: u32,
    multi_bias: bool,
    receptor_atoms: usize,
}

impl BatchPacker {
    pub fn new(
        model: MemoryModel,
        budget_mib: u64,
        exhaustiveness: u32,
        multi_bias: bool,
        receptor_atoms: usize,
    ) -> Self {
        Self {
            model,
            budget_mib,
            exhaustiveness,
            multi_bias,
            receptor_atoms,
        }
    }

    pub fn budget_mib(&self) -> u64 {
        self.budget_mib
    }

    /// Computes batch boundaries for `ligands` without moving them.
    pub fn shapes<'l, I>(&self, ligands: I) -> Vec<BatchShape>
    where
        I: IntoIterator<Item = &'l Ligand>,
    {
        let mut shapes = Vec::new();
        let mut open: Option<BatchShape> = None;

        for (position, ligand) in ligands.into_iter().enumerate() {
            let contribution = ligand.atom_pair_contribution(self.receptor_atoms);

            if let Some(batch) = open.as_mut() {
                let tentative_pairs = batch.atom_pair_total.saturating_add(contribution);
                let tentative_mib = self.model.predict(
                    batch.len + 1,
                    self.exhaustiveness,
                    tentative_pairs,
                    self.multi_bias,
                );
                if tentative_mib < self.budget_mib {
                    batch.len += 1;
                    batch.atom_pair_total = tentative_pairs;
                    batch.predicted_mib = tentative_mib;
                    continue;
                }
                shapes.extend(open.take());
            }

            let predicted_mib =
                self.model
                    .predict(1, self.exhaustiveness, contribution, self.multi_bias);
            if predicted_mib >= self.budget_mib {
                warn!(
                    ligand = %ligand.source().display(),
                    predicted_mib,
                    budget_mib = self.budget_mib,
                    "Ligand alone exceeds the memory budget, dispatching it as a batch of one"
                );
            }
            open = Some(BatchShape {
                start: position,
                len: 1,
                atom_pair_total: contribution,
                predicted_mib,
            });
        }

        shapes.extend(open);
        shapes
    }

    /// Splits a chunk into batches, consuming it.
    pub fn pack(&self, chunk: LoadChunk) -> Vec<Batch> {
        let shapes = self.shapes(chunk.ligands.iter().map(|named| &named.ligand));
        debug!(
            chunk = chunk.index,
            ligands = chunk.ligands.len(),
            batches = shapes.len(),
            "Packed chunk"
        );

        let mut remaining = chunk.ligands.into_iter();
        shapes
            .into_iter()
            .map(|shape| Batch {
                chunk_index: chunk.index,
                shape,
                ligands: remaining.by_ref().take(shape.len).collect(),
            })
            .collect()
    }
}
