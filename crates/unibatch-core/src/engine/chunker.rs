use super::progress::{Progress, ProgressReporter};
use crate::core::io::paths;
use crate::core::io::reader::LigandReader;
use crate::core::models::ligand::{Ligand, NamedLigand};
use std::path::{Path, PathBuf};
use std::slice::Chunks;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One bounded slice of the input, fully parsed and in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadChunk {
    /// Position of this chunk in the sequence of chunks, from 0.
    pub index: usize,
    /// Position of the chunk's first ligand in the full input list.
    pub offset: usize,
    pub ligands: Vec<NamedLigand>,
}

/// Splits an ordered ligand path list into chunks of at most `chunk_limit` paths and parses
/// each chunk in parallel when it is requested.
///
/// At most one chunk of parsed ligands is resident per iteration step. A ligand whose file
/// fails to parse is kept as a zero-atom placeholder at its original position.
pub struct LigandLoadChunker<'a, 'r, R: LigandReader + ?Sized> {
    remaining: Chunks<'a, PathBuf>,
    reader: &'a R,
    multi_bias: bool,
    reporter: &'a ProgressReporter<'r>,
    next_index: usize,
    offset: usize,
}

impl<'a, 'r, R: LigandReader + ?Sized> LigandLoadChunker<'a, 'r, R> {
    pub fn new(
        paths: &'a [PathBuf],
        reader: &'a R,
        chunk_limit: usize,
        multi_bias: bool,
        reporter: &'a ProgressReporter<'r>,
    ) -> Self {
        Self {
            remaining: paths.chunks(chunk_limit.max(1)),
            reader,
            multi_bias,
            reporter,
            next_index: 0,
            offset: 0,
        }
    }

    fn load(&self, paths: &[PathBuf]) -> Vec<NamedLigand> {
        let merged: Mutex<Vec<(usize, NamedLigand)>> = Mutex::new(Vec::with_capacity(paths.len()));

        #[cfg(not(feature = "parallel"))]
        let iterator = paths.iter().enumerate();

        #[cfg(feature = "parallel")]
        let iterator = paths.par_iter().enumerate();

        iterator.for_each(|(position, path)| {
            let named = self.read_one(path);
            self.reporter.report(Progress::TaskIncrement);
            merged
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((position, named));
        });

        let mut ligands = merged.into_inner().unwrap_or_else(PoisonError::into_inner);
        ligands.sort_unstable_by_key(|(position, _)| *position);
        ligands.into_iter().map(|(_, named)| named).collect()
    }

    fn read_one(&self, path: &Path) -> NamedLigand {
        let ligand = match self.reader.read(path) {
            Ok(ligand) => ligand,
            Err(e) => {
                warn!(ligand = %path.display(), error = %e, "Failed to parse ligand, keeping placeholder");
                Ligand::placeholder(path, e.to_string())
            }
        };
        let ligand = if self.multi_bias {
            ligand.with_bias_path(paths::bias_path(path))
        } else {
            ligand
        };
        NamedLigand::new(path.to_string_lossy(), ligand)
    }
}

impl<R: LigandReader + ?Sized> Iterator for LigandLoadChunker<'_, '_, R> {
    type Item = LoadChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let paths = self.remaining.next()?;
        let index = self.next_index;
        let offset = self.offset;
        debug!(chunk = index, offset, size = paths.len(), "Loading ligand chunk");

        self.reporter.report(Progress::TaskStart {
            total: paths.len() as u64,
        });
        let ligands = self.load(paths);
        self.reporter.report(Progress::TaskFinish);

        self.next_index += 1;
        self.offset += paths.len();
        Some(LoadChunk {
            index,
            offset,
            ligands,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.remaining.size_hint()
    }
}
