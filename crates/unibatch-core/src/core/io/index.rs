use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexFileError {
    #[error("Could not open ligand index '{path}' for reading: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Ligand index '{0}' lists no ligands")]
    Empty(PathBuf),
}

/// Reads a ligand index: a text file of whitespace-separated ligand paths, in docking order.
pub fn read_ligand_index(path: &Path) -> Result<Vec<PathBuf>, IndexFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| IndexFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ligands: Vec<PathBuf> = content.split_whitespace().map(PathBuf::from).collect();
    if ligands.is_empty() {
        return Err(IndexFileError::Empty(path.to_path_buf()));
    }
    Ok(ligands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_paths_split_on_any_whitespace() {
        let dir = tempdir().unwrap();
        let index = dir.path().join("index.txt");
        fs::write(&index, "a.pdbqt b.pdbqt\n\tc.sdf\n\n").unwrap();

        let ligands = read_ligand_index(&index).unwrap();
        assert_eq!(
            ligands,
            vec![
                PathBuf::from("a.pdbqt"),
                PathBuf::from("b.pdbqt"),
                PathBuf::from("c.sdf")
            ]
        );
    }

    #[test]
    fn missing_index_is_io_error() {
        let dir = tempdir().unwrap();
        let result = read_ligand_index(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(IndexFileError::Io { .. })));
    }

    #[test]
    fn blank_index_is_rejected() {
        let dir = tempdir().unwrap();
        let index = dir.path().join("index.txt");
        fs::write(&index, "  \n").unwrap();
        assert!(matches!(
            read_ligand_index(&index),
            Err(IndexFileError::Empty(_))
        ));
    }
}
