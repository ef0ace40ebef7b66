use super::traits::{AtomCountFormat, LigandReadError};
use std::io::BufRead;

const COUNTS_LINE_INDEX: usize = 3;

pub struct SdfFile;

impl AtomCountFormat for SdfFile {
    fn count_atoms(reader: &mut impl BufRead) -> Result<usize, LigandReadError> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = idx + 1;

            if idx == COUNTS_LINE_INDEX && !line.contains("V3000") {
                return parse_v2000_counts(&line, line_num);
            }
            if let Some(rest) = line.strip_prefix("M  V30 COUNTS") {
                return parse_v3000_counts(rest, line_num);
            }
            if line.starts_with("$$$$") {
                break;
            }
        }
        Err(LigandReadError::NoAtoms)
    }
}

fn parse_v2000_counts(line: &str, line_num: usize) -> Result<usize, LigandReadError> {
    let field = line.get(0..3).unwrap_or(line).trim();
    let count: usize = field.parse().map_err(|_| LigandReadError::Parse {
        line: line_num,
        message: format!("invalid atom count '{}' in counts line", field),
    })?;
    if count == 0 {
        return Err(LigandReadError::NoAtoms);
    }
    Ok(count)
}

fn parse_v3000_counts(rest: &str, line_num: usize) -> Result<usize, LigandReadError> {
    let field = rest.split_whitespace().next().unwrap_or("");
    let count: usize = field.parse().map_err(|_| LigandReadError::Parse {
        line: line_num,
        message: format!("invalid V3000 atom count '{}'", field),
    })?;
    if count == 0 {
        return Err(LigandReadError::NoAtoms);
    }
    Ok(count)
}
