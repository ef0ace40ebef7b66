//! Deterministic file-system naming conventions shared with the docking engine.

use std::path::{Path, PathBuf};

const OUTPUT_SUFFIX: &str = "_out";
const DEFAULT_POSE_EXTENSION: &str = "pdbqt";
const BIAS_EXTENSION: &str = "bpf";

/// Pose output path for a ligand: `<out_dir>/<stem>_out.<ext>`.
///
/// The extension of the source is kept so SDF inputs produce SDF poses; sources without an
/// extension get `.pdbqt`.
pub fn pose_output_path(source: &Path, out_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_POSE_EXTENSION.to_string());
    out_dir.join(format!("{stem}{OUTPUT_SUFFIX}.{extension}"))
}

/// Per-ligand bias file: the ligand source with its extension replaced by `.bpf`.
pub fn bias_path(source: &Path) -> PathBuf {
    source.with_extension(BIAS_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_output_keeps_extension_and_drops_source_directory() {
        let out = pose_output_path(Path::new("/data/ligs/ZINC001.pdbqt"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/ZINC001_out.pdbqt"));
    }

    #[test]
    fn pose_output_for_sdf_stays_sdf() {
        let out = pose_output_path(Path::new("ligs/a.sdf"), Path::new("res"));
        assert_eq!(out, PathBuf::from("res/a_out.sdf"));
    }

    #[test]
    fn pose_output_defaults_extension() {
        let out = pose_output_path(Path::new("ligs/a"), Path::new("res"));
        assert_eq!(out, PathBuf::from("res/a_out.pdbqt"));
    }

    #[test]
    fn pose_output_only_strips_last_extension() {
        let out = pose_output_path(Path::new("ligs/a.min.pdbqt"), Path::new("res"));
        assert_eq!(out, PathBuf::from("res/a.min_out.pdbqt"));
    }

    #[test]
    fn bias_path_replaces_extension_in_place() {
        assert_eq!(
            bias_path(Path::new("/data/ligs/ZINC001.pdbqt")),
            PathBuf::from("/data/ligs/ZINC001.bpf")
        );
    }
}
