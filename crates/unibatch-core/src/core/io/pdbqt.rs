use super::traits::{AtomCountFormat, LigandReadError};
use std::io::BufRead;

pub struct PdbqtFile;

impl AtomCountFormat for PdbqtFile {
    fn count_atoms(reader: &mut impl BufRead) -> Result<usize, LigandReadError> {
        let mut count = 0;
        for line in reader.lines() {
            let line = line?;
            let record = line.get(0..6).unwrap_or(line.as_str()).trim_end();
            match record {
                "ATOM" | "HETATM" => count += 1,
                "ENDMDL" if count > 0 => break,
                _ => {}
            }
        }
        if count == 0 {
            return Err(LigandReadError::NoAtoms);
        }
        Ok(count)
    }
}
