//! Device memory prediction.
//!
//! The scheduler never allocates device memory itself. It predicts what the docking engine
//! will allocate for a candidate batch shape and packs batches so that prediction stays under
//! the resolved budget.

pub mod layout;
pub mod model;

pub const BYTES_PER_MIB: u64 = 1024 * 1024;
