//! # Engine Module
//!
//! This module implements the scheduling engine that turns an ordered list of ligand paths
//! into a sequence of memory-safe accelerator dispatches.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Search parameters, scheduling limits and output settings
//! - **Device Resolution** ([`device`], [`budget`]) - Device selection and the memory ceiling
//! - **Loading** ([`chunker`]) - Bounded, parallel ligand parsing into ordered chunks
//! - **Packing** ([`packer`]) - Greedy, order-preserving grouping of ligands into batches
//! - **Collaborators** ([`worker`]) - Traits implemented by the docking engine
//! - **Progress Monitoring** ([`progress`]) - Progress reporting and user feedback mechanisms
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//!
//! ## Key Capabilities
//!
//! - **Two-level chunking** bounding host memory (load chunks) and device memory (batches)
//! - **Predictive packing** against a versioned device buffer layout
//! - **Starvation guard** admitting any single ligand even when it alone exceeds the budget
//! - **Template reuse** where each batch docks on an owned copy of shared receptor state

pub mod budget;
pub mod chunker;
pub mod config;
pub mod device;
pub mod error;
pub mod packer;
pub mod progress;
pub mod worker;
