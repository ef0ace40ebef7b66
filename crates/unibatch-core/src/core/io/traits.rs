use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LigandReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Unsupported ligand format '{0}' (expected .pdbqt, .sdf or .mol)")]
    UnsupportedFormat(String),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("No atom records found")]
    NoAtoms,
}

/// Defines the interface for extracting an atom count from a molecular file format.
///
/// Implementors handle format-specific record layouts. Only the first molecule (or model)
/// of a file is counted.
pub trait AtomCountFormat {
    /// Counts the atoms of the first molecule in a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or I/O fails.
    fn count_atoms(reader: &mut impl BufRead) -> Result<usize, LigandReadError>;

    /// Counts the atoms of the first molecule in the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or counting fails.
    fn count_atoms_in_path<P: AsRef<Path>>(path: P) -> Result<usize, LigandReadError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::count_atoms(&mut reader)
    }
}
