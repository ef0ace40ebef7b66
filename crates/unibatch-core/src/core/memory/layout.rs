use serde::Deserialize;

/// Per-element byte sizes of the docking engine's device buffer classes.
///
/// This table is a versioned contract with the search engine: whenever the engine changes the
/// layout of one of its device structures, the matching entry here must change with it,
/// otherwise batch sizes will be mispredicted. [`BufferLayout::ENGINE_V1`] is the layout of the
/// Vina-derived GPU engine this scheduler was built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BufferLayout {
    /// One entry of the pairwise precalculation table, allocated per atom pair.
    pub precalc_element: u64,
    /// Ligand/receptor model, allocated per ligand and again per replica.
    pub model: u64,
    /// Grid cache; one per ligand in multi-bias mode, otherwise a single shared instance.
    pub grid: u64,
    /// Ligand parameter block, per ligand.
    pub ligand_params: u64,
    /// Randomized starting conformation, per replica.
    pub molecule_state: u64,
    /// Search output container, per replica.
    pub output: u64,
    /// BFGS Hessian matrix, per replica.
    pub hessian: u64,
    /// Gradient/change vector used by the local optimizer, per replica.
    pub change: u64,
    /// Potential energy scratch, per replica.
    pub potential: u64,
    /// Random number generator state, per replica.
    pub rng_state: u64,
    /// Number of auxiliary change buffers kept by the optimizer per replica.
    pub change_aux_copies: u64,
    /// Number of auxiliary output buffers kept per replica.
    pub output_aux_copies: u64,
}

impl BufferLayout {
    pub const ENGINE_V1: BufferLayout = BufferLayout {
        precalc_element: 24_616,
        model: 57_344,
        grid: 4_096,
        ligand_params: 15_616,
        molecule_state: 3_328,
        output: 3_328,
        hessian: 5_248,
        change: 1_280,
        potential: 2_112,
        rng_state: 64,
        change_aux_copies: 6,
        output_aux_copies: 5,
    };

    /// Bytes allocated once per ligand in the batch.
    pub fn per_ligand_bytes(&self, multi_bias: bool) -> u64 {
        let grid = if multi_bias { self.grid } else { 0 };
        self.model.saturating_add(self.ligand_params).saturating_add(grid)
    }

    /// Bytes allocated once per replica (ligand x exhaustiveness).
    pub fn per_replica_bytes(&self) -> u64 {
        [
            self.molecule_state,
            self.output,
            self.model,
            self.hessian,
            self.change_aux_copies.saturating_mul(self.change),
            self.output_aux_copies.saturating_mul(self.output),
            self.potential,
            self.rng_state,
        ]
        .into_iter()
        .fold(0, u64::saturating_add)
    }

    /// Bytes allocated regardless of batch shape.
    pub fn fixed_bytes(&self, multi_bias: bool) -> u64 {
        if multi_bias { 0 } else { self.grid }
    }
}

impl Default for BufferLayout {
    fn default() -> Self {
        Self::ENGINE_V1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_grid_is_fixed_only_without_multi_bias() {
        let layout = BufferLayout::ENGINE_V1;
        assert_eq!(layout.fixed_bytes(false), layout.grid);
        assert_eq!(layout.fixed_bytes(true), 0);
        assert_eq!(
            layout.per_ligand_bytes(true) - layout.per_ligand_bytes(false),
            layout.grid
        );
    }

    #[test]
    fn per_replica_bytes_applies_auxiliary_multipliers() {
        let layout = BufferLayout {
            precalc_element: 0,
            model: 0,
            grid: 0,
            ligand_params: 0,
            molecule_state: 0,
            output: 10,
            hessian: 0,
            change: 100,
            potential: 0,
            rng_state: 64,
            change_aux_copies: 6,
            output_aux_copies: 5,
        };
        assert_eq!(layout.per_replica_bytes(), 10 + 600 + 50 + 64);
    }

    #[test]
    fn oversized_entries_saturate() {
        let mut layout = BufferLayout::ENGINE_V1;
        layout.change = u64::MAX / 4;
        layout.model = u64::MAX - 1;
        assert_eq!(layout.per_replica_bytes(), u64::MAX);
        assert_eq!(layout.per_ligand_bytes(true), u64::MAX);
    }
}
