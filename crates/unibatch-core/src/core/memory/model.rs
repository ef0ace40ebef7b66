use super::BYTES_PER_MIB;
use super::layout::BufferLayout;

/// Predicts device memory consumption of a docking dispatch.
///
/// The prediction sums three families of buffers:
///
/// - the precalculation table, scaled by the batch's atom-pair total;
/// - per-ligand state, scaled by `batch_size`;
/// - per-replica search state, scaled by `batch_size * exhaustiveness`;
///
/// plus whatever is allocated once per dispatch. All arithmetic saturates, so absurd inputs
/// predict "more than any device has" instead of wrapping around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryModel {
    layout: BufferLayout,
}

impl MemoryModel {
    pub fn new(layout: BufferLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    /// Predicted footprint in bytes.
    pub fn predict_bytes(
        &self,
        batch_size: usize,
        exhaustiveness: u32,
        atom_pair_total: u64,
        multi_bias: bool,
    ) -> u64 {
        let layout = &self.layout;
        let ligands = batch_size as u64;
        let replicas = ligands.saturating_mul(u64::from(exhaustiveness));

        let precalc = atom_pair_total.saturating_mul(layout.precalc_element);
        let per_ligand = ligands.saturating_mul(layout.per_ligand_bytes(multi_bias));
        let per_replica = replicas.saturating_mul(layout.per_replica_bytes());

        layout
            .fixed_bytes(multi_bias)
            .saturating_add(precalc)
            .saturating_add(per_ligand)
            .saturating_add(per_replica)
    }

    /// Predicted footprint in whole MiB, truncated.
    pub fn predict(
        &self,
        batch_size: usize,
        exhaustiveness: u32,
        atom_pair_total: u64,
        multi_bias: bool,
    ) -> u64 {
        self.predict_bytes(batch_size, exhaustiveness, atom_pair_total, multi_bias) / BYTES_PER_MIB
    }
}

/// Predicts the footprint in MiB using [`BufferLayout::ENGINE_V1`].
pub fn predict(batch_size: usize, exhaustiveness: u32, atom_pair_total: u64, multi_bias: bool) -> u64 {
    MemoryModel::default().predict(batch_size, exhaustiveness, atom_pair_total, multi_bias)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXHAUSTIVENESS_SAMPLES: [u32; 4] = [1, 8, 128, 512];

    #[test]
    fn empty_batch_predicts_only_fixed_overhead() {
        let model = MemoryModel::default();
        for e in EXHAUSTIVENESS_SAMPLES {
            for multi_bias in [false, true] {
                let expected = model.layout().fixed_bytes(multi_bias);
                assert_eq!(model.predict_bytes(0, e, 0, multi_bias), expected);
                assert_eq!(model.predict(0, e, 0, multi_bias), expected / BYTES_PER_MIB);
            }
        }
    }

    #[test]
    fn prediction_matches_hand_computed_sum() {
        let layout = BufferLayout::ENGINE_V1;
        let model = MemoryModel::new(layout);
        let (batch, e, pairs) = (3u64, 8u64, 40_000u64);

        let expected = layout.grid
            + pairs * layout.precalc_element
            + batch * (layout.model + layout.ligand_params)
            + batch
                * e
                * (layout.molecule_state
                    + layout.output
                    + layout.model
                    + layout.hessian
                    + 6 * layout.change
                    + 5 * layout.output
                    + layout.potential
                    + 64);

        assert_eq!(model.predict_bytes(3, 8, pairs, false), expected);
        assert_eq!(model.predict(3, 8, pairs, false), expected / BYTES_PER_MIB);
    }

    #[test]
    fn prediction_truncates_to_whole_mib() {
        let layout = BufferLayout {
            precalc_element: 1,
            model: 0,
            grid: 0,
            ligand_params: 0,
            molecule_state: 0,
            output: 0,
            hessian: 0,
            change: 0,
            potential: 0,
            rng_state: 0,
            change_aux_copies: 0,
            output_aux_copies: 0,
        };
        let model = MemoryModel::new(layout);
        assert_eq!(model.predict(1, 1, BYTES_PER_MIB - 1, false), 0);
        assert_eq!(model.predict(1, 1, BYTES_PER_MIB, false), 1);
        assert_eq!(model.predict(1, 1, 2 * BYTES_PER_MIB + 17, false), 2);
    }

    #[test]
    fn prediction_is_monotone_in_batch_size() {
        let model = MemoryModel::default();
        for multi_bias in [false, true] {
            let mut previous = 0;
            for batch in 0..200 {
                let current = model.predict_bytes(batch, 64, 1_000_000, multi_bias);
                assert!(current >= previous, "batch {batch} decreased prediction");
                previous = current;
            }
        }
    }

    #[test]
    fn prediction_is_monotone_in_exhaustiveness() {
        let model = MemoryModel::default();
        let mut previous = 0;
        for e in 1..600 {
            let current = model.predict(32, e, 5_000_000, false);
            assert!(current >= previous, "exhaustiveness {e} decreased prediction");
            previous = current;
        }
    }

    #[test]
    fn prediction_is_monotone_in_atom_pair_total() {
        let model = MemoryModel::default();
        let mut previous = 0;
        for step in 0..500u64 {
            let current = model.predict(16, 8, step * 9_973, true);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn multi_bias_costs_one_grid_per_ligand() {
        let model = MemoryModel::default();
        let grid = model.layout().grid;
        let shared = model.predict_bytes(10, 8, 0, false);
        let per_ligand = model.predict_bytes(10, 8, 0, true);
        assert_eq!(per_ligand - shared, 9 * grid);
    }

    #[test]
    fn huge_inputs_saturate_instead_of_wrapping() {
        let model = MemoryModel::default();
        assert_eq!(
            model.predict_bytes(usize::MAX, u32::MAX, u64::MAX, true),
            u64::MAX
        );
    }

    #[test]
    fn extreme_layout_entry_predicts_unbounded_footprint() {
        let mut layout = BufferLayout::ENGINE_V1;
        layout.change = u64::MAX / 4;
        let model = MemoryModel::new(layout);
        assert_eq!(model.predict_bytes(1, 1, 0, false), u64::MAX);
        assert!(model.predict(1, 1, 0, false) > 1 << 40);
    }

    #[test]
    fn free_function_uses_default_layout() {
        assert_eq!(
            predict(4, 8, 123_456, false),
            MemoryModel::new(BufferLayout::ENGINE_V1).predict(4, 8, 123_456, false)
        );
    }
}
