// src/data_analysis/return_loss.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::{RETURN_LOSS_REQUIRED_SUBSTRING, TOUCHSTONE_EXTENSION};
use crate::data_input::file_discovery::{file_name_str, find_files_with_extension};
use crate::data_input::touchstone::read_s1p_file;
use crate::error::AnalysisResult;

/// One class of RF measurement, recognised by a file-name substring.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReturnLossCategory {
    pub pattern: String,
    pub label: String,
    /// RGB
    pub color: [u8; 3],
}

impl ReturnLossCategory {
    fn new(pattern: &str, label: &str, color: [u8; 3]) -> Self {
        Self {
            pattern: pattern.to_string(),
            label: label.to_string(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReturnLossConfig {
    pub extension: String,
    /// Files must contain this substring to be considered at all.
    pub required_substring: String,
    /// Checked in order; the first pattern found in the file name wins.
    pub categories: Vec<ReturnLossCategory>,
}

impl Default for ReturnLossConfig {
    fn default() -> Self {
        // More specific patterns first: "HWT_OFF" also contains "OFF".
        Self {
            extension: TOUCHSTONE_EXTENSION.to_string(),
            required_substring: RETURN_LOSS_REQUIRED_SUBSTRING.to_string(),
            categories: vec![
                ReturnLossCategory::new("HWT_OFF", "FPGA w/HWT power off", [0, 0, 255]),
                ReturnLossCategory::new("HWT_ON", "FPGA w/HWT power on", [0, 128, 0]),
                ReturnLossCategory::new("OFF", "FPGA power off", [0, 0, 0]),
                ReturnLossCategory::new("ON", "FPGA power on", [255, 0, 0]),
            ],
        }
    }
}

/// Index of the first category whose pattern occurs in `file_name`.
pub fn classify(file_name: &str, categories: &[ReturnLossCategory]) -> Option<usize> {
    categories
        .iter()
        .position(|category| file_name.contains(category.pattern.as_str()))
}

/// |S11| in dB against frequency for one file.
#[derive(Debug, Clone)]
pub struct ReturnLossCurve {
    pub file_name: String,
    pub category: usize,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct ReturnLossSet {
    pub curves: Vec<ReturnLossCurve>,
    /// Matching files that could not be loaded, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Files that matched no category.
    pub unclassified: Vec<PathBuf>,
}

impl ReturnLossSet {
    pub fn curves_in(&self, category: usize) -> impl Iterator<Item = &ReturnLossCurve> {
        self.curves.iter().filter(move |c| c.category == category)
    }
}

/// Loads every matching network file from `directories`.
///
/// A file that fails to parse is logged and skipped; only an unreadable directory
/// aborts the load.
pub fn load_return_loss_curves(
    directories: &[PathBuf],
    config: &ReturnLossConfig,
) -> AnalysisResult<ReturnLossSet> {
    let mut set = ReturnLossSet::default();
    for dir in directories {
        let files = find_files_with_extension(dir, &config.extension)?;
        debug!(dir = %dir.display(), files = files.len(), "scanning for network files");
        for path in files {
            let file_name = file_name_str(&path);
            if !file_name.contains(config.required_substring.as_str()) {
                continue;
            }
            let Some(category) = classify(&file_name, &config.categories) else {
                debug!(file = %file_name, "no return-loss category matches, skipping");
                set.unclassified.push(path);
                continue;
            };
            match load_curve(&path, &file_name, category) {
                Ok(curve) => set.curves.push(curve),
                Err(e) => {
                    warn!(file = %path.display(), "skipping network file: {e}");
                    set.failed.push((path, e.to_string()));
                }
            }
        }
    }
    Ok(set)
}

fn load_curve(path: &Path, file_name: &str, category: usize) -> AnalysisResult<ReturnLossCurve> {
    let network = read_s1p_file(path)?;
    let points = network
        .s11_db()
        .into_iter()
        .filter(|(_, db)| db.is_finite())
        .collect();
    Ok(ReturnLossCurve {
        file_name: file_name.to_string(),
        category,
        points,
    })
}
