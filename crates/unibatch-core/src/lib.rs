//! # Uni-Batch Core Library
//!
//! A memory-aware batch scheduler for large-scale virtual screening: docking thousands to
//! millions of small-molecule ligands against a fixed receptor on a memory-constrained
//! accelerator device.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that the scheduling logic can be
//! tested without a device, a docking engine, or real ligand files.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Ligand`), ligand file reading and
//!   path conventions, and the pure device-memory cost model (`MemoryModel`).
//!
//! - **[`engine`]: The Logic Core.** Configuration, budget resolution against a device probe,
//!   the bounded parallel `LigandLoadChunker`, the greedy `BatchPacker`, and the collaborator
//!   traits implemented by a docking engine (`DockingTemplate`, `DockingSession`).
//!
//! - **[`workflows`]: The Public API.** Drives a complete screening run chunk by chunk and
//!   batch by batch, and the alternate paired-batch launch path.

pub mod core;
pub mod engine;
pub mod workflows;
