use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome of reading a ligand file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LigandStatus {
    /// The file was read and its atoms counted.
    Parsed,
    /// The file could not be read. The ligand still occupies its slot with zero atoms so that
    /// batch accounting and output paths stay positionally consistent with the input list.
    Placeholder { reason: String },
}

/// A ligand as seen by the scheduler.
///
/// Immutable once constructed. Only the attributes that drive memory prediction, bias loading
/// and output naming are kept; the full molecular model belongs to the docking engine, which
/// re-reads the source when it needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ligand {
    source: PathBuf,
    atom_count: usize,
    bias_path: Option<PathBuf>,
    status: LigandStatus,
}

impl Ligand {
    pub fn new(source: impl Into<PathBuf>, atom_count: usize) -> Self {
        Self {
            source: source.into(),
            atom_count,
            bias_path: None,
            status: LigandStatus::Parsed,
        }
    }

    /// Creates the degenerate stand-in for a ligand whose file failed to parse.
    pub fn placeholder(source: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            atom_count: 0,
            bias_path: None,
            status: LigandStatus::Placeholder {
                reason: reason.into(),
            },
        }
    }

    pub fn with_bias_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bias_path = Some(path.into());
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    pub fn bias_path(&self) -> Option<&Path> {
        self.bias_path.as_deref()
    }

    pub fn status(&self) -> &LigandStatus {
        &self.status
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.status, LigandStatus::Placeholder { .. })
    }

    /// Contribution of this ligand to a batch's atom-pair total: `(ligand + receptor atoms)^2`.
    ///
    /// A placeholder contributes `receptor_atoms^2`, so it is still memory-accounted.
    pub fn atom_pair_contribution(&self, receptor_atoms: usize) -> u64 {
        let atoms = (self.atom_count as u64).saturating_add(receptor_atoms as u64);
        atoms.saturating_mul(atoms)
    }
}

/// A ligand paired with the name it was listed under in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLigand {
    pub name: String,
    pub ligand: Ligand,
}

impl NamedLigand {
    pub fn new(name: impl Into<String>, ligand: Ligand) -> Self {
        Self {
            name: name.into(),
            ligand,
        }
    }
}

impl fmt::Display for NamedLigand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} atoms)", self.name, self.ligand.atom_count)
    }
}
