// src/batch.rs

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::constants::CAPTURE_FILE_EXTENSION;
use crate::data_analysis::aggregation::DeviceRecords;
use crate::data_analysis::cycle_delay::clock_cycle_delays;
use crate::data_analysis::edge_detection::EdgeDirection;
use crate::data_analysis::propagation_delay::{edge_delay_summary, propagation_delays, EdgeDelaySummary};
use crate::data_input::capture_data::Channel;
use crate::data_input::capture_parser::{parse_capture_file, ParsedCapture};
use crate::data_input::file_discovery::{file_name_str, find_files_with_extension};
use crate::error::{AnalysisError, AnalysisResult};

/// Aggregated records of a batch plus bookkeeping about the files it visited.
#[derive(Debug, Clone)]
pub struct BatchOutcome<R> {
    pub records: R,
    pub processed: usize,
    /// Files that failed and were left out, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    /// Malformed data rows dropped across all processed files.
    pub skipped_rows: usize,
}

impl<R> BatchOutcome<R> {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Per-device results of the clock/enable/output experiment.
#[derive(Debug, Clone, Default)]
pub struct ClockCycleRecords {
    /// Enable edge to first output change, in clock cycles.
    pub cycle_delays: DeviceRecords<i64>,
    /// Clock edge to next output change, inside the plausibility window.
    pub propagation_delays: DeviceRecords<f64>,
}

/// Per-device mean edge delays of the input/output experiment.
#[derive(Debug, Clone, Default)]
pub struct EdgeDelayRecords {
    pub rising: DeviceRecords<f64>,
    pub falling: DeviceRecords<f64>,
}

impl EdgeDelayRecords {
    pub fn direction(&self, direction: EdgeDirection) -> &DeviceRecords<f64> {
        match direction {
            EdgeDirection::Rising => &self.rising,
            EdgeDirection::Falling => &self.falling,
        }
    }

    fn record(&mut self, device_id: &str, summary: EdgeDelaySummary) {
        self.rising.record(device_id, summary.rising);
        self.falling.record(device_id, summary.falling);
    }
}

pub type ClockCycleOutcome = BatchOutcome<ClockCycleRecords>;
pub type PropagationOutcome = BatchOutcome<EdgeDelayRecords>;

/// Logs the scope metadata of one capture and returns its dropped row count.
fn note_capture(file_name: &str, parsed: &ParsedCapture) -> usize {
    debug!(file = file_name, metadata = ?parsed.metadata, "capture metadata");
    if parsed.skipped_rows > 0 {
        info!(file = file_name, rows = parsed.skipped_rows, "malformed rows dropped");
    }
    parsed.skipped_rows
}

/// Visits every capture in `dir` in name order, handing each to `analyse`.
///
/// `analyse` returns the number of malformed rows it dropped. File-scoped errors are
/// logged and the file is counted as skipped; any other error (a bad channel layout,
/// no time base) would repeat for every file and ends the batch.
fn run_batch<R, F>(dir: &Path, mut records: R, mut analyse: F) -> AnalysisResult<BatchOutcome<R>>
where
    F: FnMut(&Path, &str, &mut R) -> AnalysisResult<usize>,
{
    let files = find_files_with_extension(dir, CAPTURE_FILE_EXTENSION)?;
    info!(dir = %dir.display(), files = files.len(), "starting capture batch");

    let mut processed = 0;
    let mut skipped = Vec::new();
    let mut skipped_rows = 0;
    for path in files {
        let file_name = file_name_str(&path);
        match analyse(&path, &file_name, &mut records) {
            Ok(rows) => {
                processed += 1;
                skipped_rows += rows;
            }
            Err(e) if e.is_file_scoped() => {
                warn!(file = %file_name, "skipping capture: {e}");
                skipped.push((path, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }
    info!(processed, skipped = skipped.len(), skipped_rows, "capture batch finished");
    Ok(BatchOutcome {
        records,
        processed,
        skipped,
        skipped_rows,
    })
}

/// Cycle and clock-to-output delays for every capture in `dir`, grouped by device.
pub fn run_clock_cycle_batch(dir: &Path, config: &AnalysisConfig) -> AnalysisResult<ClockCycleOutcome> {
    let cycle = &config.clock_cycle;
    let unit = config.capture.time_unit;

    run_batch(dir, ClockCycleRecords::default(), |path, file_name, records| {
        let parsed = parse_capture_file(path, &config.capture, &cycle.channels)?;
        let data = &parsed.data;
        let clock = data.trace(Channel::Clock)?;
        let enable = data.trace(Channel::Enable)?;
        let output = data.trace(Channel::Output)?;

        let cycles = clock_cycle_delays(&clock, &enable, &output, cycle.trigger_edge)?;
        let delays = cycle
            .plausibility
            .apply(propagation_delays(&clock, &output, cycle.reference_edge, unit));
        debug!(
            file = file_name,
            samples = data.len(),
            cycles = cycles.len(),
            delays = delays.len(),
            "analysed capture"
        );

        let device_id = config.device_id.device_for(file_name);
        records.cycle_delays.record(&device_id, cycles);
        records.propagation_delays.record(&device_id, delays);
        Ok(note_capture(file_name, &parsed))
    })
}

/// Per-file mean rising and falling input-to-output delays for every capture in `dir`.
pub fn run_propagation_batch(dir: &Path, config: &AnalysisConfig) -> AnalysisResult<PropagationOutcome> {
    let channels = &config.propagation.channels;
    let unit = config.capture.time_unit;

    run_batch(dir, EdgeDelayRecords::default(), |path, file_name, records| {
        let parsed = parse_capture_file(path, &config.capture, channels)?;
        let input = parsed.data.trace(Channel::Input)?;
        let output = parsed.data.trace(Channel::Output)?;

        let summary = edge_delay_summary(&input, &output, unit);
        if summary.is_empty() {
            debug!(file = file_name, "no non-negative edge pairs");
        }
        let device_id = config.device_id.device_for(file_name);
        records.record(&device_id, summary);
        Ok(note_capture(file_name, &parsed))
    })
}

/// Rejects a missing or non-directory path before any file is touched.
pub fn ensure_directory(dir: &Path) -> AnalysisResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(AnalysisError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use std::fs;

    const HEADER: &str = "Model,DSO\nRecord Length,40\nSample Interval,1e-9\nTrigger Point,0\n,\n,\n,\nTIME,CH1,CH2,CH3,CH4\n";

    /// Clock of 10 ns period rising at 5, 15, 25, 35 ns; enable falls at 12 ns, output rises at 39 ns.
    fn clock_capture() -> String {
        let mut text = HEADER.to_string();
        for i in 0..40 {
            let clock = if i % 10 < 5 { 0 } else { 1 };
            let enable = if i < 12 { 1 } else { 0 };
            let output = if i < 39 { 0 } else { 1 };
            writeln!(text, "{:e},0,{},{},{}", i as f64 * 1e-9, enable, output, clock).unwrap();
        }
        text
    }

    #[test]
    fn clock_cycle_batch_groups_by_device_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cap_A1_1.csv"), clock_capture()).unwrap();
        fs::write(dir.path().join("cap_A1_2.csv"), clock_capture()).unwrap();
        fs::write(dir.path().join("cap_B2_1.csv"), HEADER).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let outcome = run_clock_cycle_batch(dir.path(), &AnalysisConfig::default()).unwrap();
        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.skipped_count(), 1);
        // 27 ns at a 10 ns period rounds to 3 cycles.
        assert_eq!(outcome.records.cycle_delays.get("A1"), Some(&[3, 3][..]));
        // Only the 35 ns clock edge lands inside 3..=8 ns (4 ns); 14, 24, 34 ns are dropped.
        let delays = outcome.records.propagation_delays.get("A1").unwrap();
        assert_eq!(delays.len(), 2);
        assert!(delays.iter().all(|d| (d - 4.0).abs() < 1e-6));
        assert!(outcome.records.cycle_delays.get("B2").is_none());
        assert_eq!(outcome.skipped_rows, 0);
    }

    #[test]
    fn malformed_rows_are_totalled_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut damaged = clock_capture();
        damaged.push_str("4.0e-8,0,garbage,1,1\n4.1e-8,0\n");
        fs::write(dir.path().join("cap_A1_1.csv"), damaged).unwrap();
        let mut damaged_again = clock_capture();
        damaged_again.push_str("not,a,number,row,here\n");
        fs::write(dir.path().join("cap_A1_2.csv"), damaged_again).unwrap();

        let outcome = run_clock_cycle_batch(dir.path(), &AnalysisConfig::default()).unwrap();
        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.skipped_rows, 3);
        assert_eq!(outcome.records.cycle_delays.get("A1"), Some(&[3, 3][..]));
    }

    #[test]
    fn unmapped_channel_aborts_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cap_A1_1.csv"), clock_capture()).unwrap();
        let mut config = AnalysisConfig::default();
        config.clock_cycle.channels.enable = None;
        assert!(matches!(
            run_clock_cycle_batch(dir.path(), &config),
            Err(AnalysisError::ChannelNotMapped(Channel::Enable))
        ));
    }

    #[test]
    fn empty_directory_is_an_empty_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_propagation_batch(dir.path(), &AnalysisConfig::default()).unwrap();
        assert_eq!(outcome.processed, 0);
        assert!(outcome.records.rising.is_empty());
        assert!(outcome.records.falling.is_empty());
    }

    #[test]
    fn missing_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_directory(&dir.path().join("nope")).is_err());
        assert!(ensure_directory(dir.path()).is_ok());
    }
}
