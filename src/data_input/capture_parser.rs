// src/data_input/capture_parser.rs

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::ReaderBuilder;
use ndarray::Array1;
use tracing::{debug, warn};

use crate::config::CaptureConfig;
use crate::data_input::capture_data::{CaptureData, Channel, ChannelMap};
use crate::error::{AnalysisError, AnalysisResult};

/// A parsed capture plus what was learned about the file while reading it.
#[derive(Debug, Clone)]
pub struct ParsedCapture {
    pub data: CaptureData,
    /// Key/value pairs found in the metadata block (e.g. scope model, record length).
    pub metadata: Vec<(String, String)>,
    /// Data rows dropped because a mapped field was missing or not numeric.
    pub skipped_rows: usize,
}

/// Opens and parses one capture file.
pub fn parse_capture_file(
    path: &Path,
    capture: &CaptureConfig,
    channels: &ChannelMap,
) -> AnalysisResult<ParsedCapture> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_capture(BufReader::new(file), path, capture, channels)
}

/// Parses capture text: `capture.header_rows` metadata lines, then positional data rows.
///
/// Only the columns named in `channels` are read. A row with a missing or non-numeric
/// mapped field is skipped with a warning. When no time column is mapped the time axis
/// is synthesized from `capture.sample_rate_hz`.
pub fn parse_capture<R: BufRead>(
    reader: R,
    source: &Path,
    capture: &CaptureConfig,
    channels: &ChannelMap,
) -> AnalysisResult<ParsedCapture> {
    if channels.time.is_none() && capture.sample_rate_hz.is_none() {
        return Err(AnalysisError::MissingTimeBase);
    }
    let delimiter = capture.delimiter as u8;

    // --- Metadata Extraction ---
    let mut metadata: Vec<(String, String)> = Vec::new();
    let mut data_lines: Vec<String> = Vec::new();
    for (line_index, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| AnalysisError::io(source, e))?;
        if line_index < capture.header_rows {
            if let Some((key, value)) = split_metadata_line(&line, capture.delimiter) {
                metadata.push((key, value));
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        data_lines.push(line);
    }
    debug!(
        file = %source.display(),
        metadata_entries = metadata.len(),
        data_lines = data_lines.len(),
        "split capture into metadata and data"
    );

    // --- Data Reading ---
    let value_channels = channels.value_channels();
    let mut time_values: Vec<f64> = Vec::with_capacity(data_lines.len());
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(data_lines.len()); value_channels.len()];
    let mut skipped_rows = 0usize;
    let min_fields = channels.max_column().map_or(0, |col| col + 1);

    let csv_content = data_lines.join("\n");
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());

    for (row_index, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(file = %source.display(), row = row_index + 1, "skipping row: {e}");
                skipped_rows += 1;
                continue;
            }
        };

        if record.len() < min_fields {
            debug!(file = %source.display(), row = row_index + 1, fields = record.len(), "skipping short row");
            skipped_rows += 1;
            continue;
        }

        let parse_col = |col: usize| -> Option<f64> {
            record
                .get(col)
                .and_then(|val_str| val_str.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        let time = match channels.time {
            Some(col) => parse_col(col),
            None => Some(0.0), // placeholder; synthesized below
        };
        let values: Option<Vec<f64>> = value_channels.iter().map(|&(_, col)| parse_col(col)).collect();

        match (time, values) {
            (Some(t), Some(vals)) => {
                time_values.push(t);
                for (column, v) in columns.iter_mut().zip(vals) {
                    column.push(v);
                }
            }
            _ => {
                debug!(file = %source.display(), row = row_index + 1, "skipping row with missing or non-numeric field");
                skipped_rows += 1;
            }
        }
    }

    if skipped_rows > 0 {
        warn!(file = %source.display(), skipped_rows, "rows skipped due to missing or invalid fields");
    }
    if time_values.is_empty() {
        return Err(AnalysisError::EmptyCapture(source.to_path_buf()));
    }

    if channels.time.is_none() {
        // Checked above: a missing time column implies a configured sample rate.
        let rate = capture.sample_rate_hz.ok_or(AnalysisError::MissingTimeBase)?;
        for (i, t) in time_values.iter_mut().enumerate() {
            *t = i as f64 / rate;
        }
    } else if let Some(pos) = time_values.windows(2).position(|w| w[1] < w[0]) {
        warn!(
            file = %source.display(),
            row = pos + 2,
            "time column is not monotonically non-decreasing"
        );
    }

    let channel_data: BTreeMap<Channel, Array1<f64>> = value_channels
        .iter()
        .zip(columns)
        .map(|(&(channel, _), column)| {
            let mut arr = Array1::from(column);
            if let Some(threshold) = capture.logic_threshold {
                arr.mapv_inplace(|v| if v >= threshold { 1.0 } else { 0.0 });
            }
            (channel, arr)
        })
        .collect();

    Ok(ParsedCapture {
        data: CaptureData {
            time_sec: Array1::from(time_values),
            channels: channel_data,
        },
        metadata,
        skipped_rows,
    })
}

/// Scope metadata rows look like `Key,Value[,...]`; anything else is ignored.
fn split_metadata_line(line: &str, delimiter: char) -> Option<(String, String)> {
    let mut parts = line.split(delimiter);
    let key = parts.next()?.trim().trim_matches('"');
    let value = parts.next()?.trim().trim_matches('"');
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
