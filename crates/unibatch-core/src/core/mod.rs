//! # Core Module
//!
//! Stateless building blocks shared by the scheduling engine.
//!
//! - **Ligand Representation** ([`models`]) - The parsed ligand as seen by the scheduler
//! - **File I/O** ([`io`]) - Ligand readers, index files and output/bias path conventions
//! - **Memory Prediction** ([`memory`]) - Device memory cost model for candidate batch shapes
//!
//! Nothing in this module touches a device or holds mutable state; every function is
//! deterministic given its inputs.

pub mod io;
pub mod memory;
pub mod models;
