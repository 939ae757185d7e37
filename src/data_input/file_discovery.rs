// src/data_input/file_discovery.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, AnalysisResult};

/// Lists regular files in `dir` whose extension matches `extension` (case-insensitive),
/// sorted by path so runs are reproducible.
pub fn find_files_with_extension(dir: &Path, extension: &str) -> AnalysisResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| AnalysisError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AnalysisError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// File name as text, for naming rules and log messages.
pub fn file_name_str(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert!(has_extension(Path::new("scope_A1_run.CSV"), "csv"));
        assert!(has_extension(Path::new("FPGA_ON.s1p"), "s1p"));
        assert!(!has_extension(Path::new("notes.txt"), "csv"));
        assert!(!has_extension(Path::new("csv"), "csv"));
    }

    #[test]
    fn lists_only_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_2.csv", "a_1.csv", "readme.md"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.csv")).unwrap();
        let files = find_files_with_extension(dir.path(), "csv").unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name_str(p)).collect();
        assert_eq!(names, vec!["a_1.csv", "b_2.csv"]);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = find_files_with_extension(Path::new("/definitely/not/here"), "csv").unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}
