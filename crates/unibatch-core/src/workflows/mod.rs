//! # Workflows Module
//!
//! High-level entry points that run a complete screening job from an ordered ligand list to
//! written pose files.
//!
//! ## Architecture
//!
//! - **Screening Workflow** ([`screen`]) - Chunked loading, memory-aware packing and sequential
//!   dispatch of batches to a docking engine, plus a dry-run planner.
//! - **Paired Workflow** ([`paired`]) - The 1:1 ligand/receptor path, delegated entirely to a
//!   [`paired::PairedBatchCoordinator`].
//!
//! ## Key Capabilities
//!
//! - **Bounded memory** on both host and device for arbitrarily long ligand lists
//! - **Positional consistency** between input order, batches and output files
//! - **Per-batch timing** surfaced through tracing and the returned report

pub mod paired;
pub mod screen;
