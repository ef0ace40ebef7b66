use super::pdbqt::PdbqtFile;
use super::sdf::SdfFile;
use super::traits::{AtomCountFormat, LigandReadError};
use crate::core::models::ligand::Ligand;
use std::path::Path;

/// Turns a ligand path into a [`Ligand`].
///
/// Implementations are shared across the parse worker pool, hence `Sync`.
pub trait LigandReader: Sync {
    fn read(&self, path: &Path) -> Result<Ligand, LigandReadError>;
}

/// Reads ligands from PDBQT or SDF/MOL files, selecting the format by extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLigandReader;

impl LigandReader for FileLigandReader {
    fn read(&self, path: &Path) -> Result<Ligand, LigandReadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let atom_count = match extension.as_str() {
            "pdbqt" => PdbqtFile::count_atoms_in_path(path)?,
            "sdf" | "mol" => SdfFile::count_atoms_in_path(path)?,
            other => return Err(LigandReadError::UnsupportedFormat(other.to_string())),
        };
        Ok(Ligand::new(path, atom_count))
    }
}

impl<F> LigandReader for F
where
    F: Fn(&Path) -> Result<Ligand, LigandReadError> + Sync,
{
    fn read(&self, path: &Path) -> Result<Ligand, LigandReadError> {
        self(path)
    }
}
