//! Molecular models consumed by the scheduler.
//!
//! The scheduler never inspects coordinates or chemistry. A [`ligand::Ligand`] carries only
//! what batching, bias loading and output naming need.

pub mod ligand;
