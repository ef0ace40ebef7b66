//! Ligand file reading and file-system conventions.
//!
//! Only the information the scheduler needs is extracted from ligand files: the atom count.
//! Full molecular parsing is the docking engine's job.

pub mod index;
pub mod paths;
pub mod pdbqt;
pub mod reader;
pub mod sdf;
pub mod traits;
