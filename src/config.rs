// src/config.rs

// Run-time configuration. Every literal the analysis depends on (column layout,
// header rows, time base, plausibility bounds, naming rule, RF categories) lives here
// with the defaults from constants.rs, and can be overridden from a TOML file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_CSV_DELIMITER, DEFAULT_HEADER_ROWS, DEFAULT_PLAUSIBLE_DELAY_MAX,
    DEFAULT_PLAUSIBLE_DELAY_MIN,
};
use crate::data_analysis::aggregation::DeviceIdRule;
use crate::data_analysis::edge_detection::EdgeDirection;
use crate::data_analysis::propagation_delay::PlausibilityWindow;
use crate::data_analysis::return_loss::ReturnLossConfig;
use crate::data_input::capture_data::ChannelMap;
use crate::error::{AnalysisError, AnalysisResult};

/// Unit used for reported delays and plausibility bounds. Traces are always held in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "us")]
    Microseconds,
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "ps")]
    Picoseconds,
}

impl TimeUnit {
    /// Multiplier converting seconds into this unit.
    pub fn scale(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1e3,
            TimeUnit::Microseconds => 1e6,
            TimeUnit::Nanoseconds => 1e9,
            TimeUnit::Picoseconds => 1e12,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Microseconds => "us",
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Picoseconds => "ps",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Picoseconds => "picoseconds",
        }
    }
}

/// How capture files are laid out on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Metadata lines preceding the first data row.
    pub header_rows: usize,
    pub delimiter: char,
    /// Used to synthesize the time axis when no time column is mapped.
    pub sample_rate_hz: Option<f64>,
    /// When set, mapped signal columns are digitized to 0/1 at this level.
    pub logic_threshold: Option<f64>,
    pub time_unit: TimeUnit,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            header_rows: DEFAULT_HEADER_ROWS,
            delimiter: DEFAULT_CSV_DELIMITER,
            sample_rate_hz: None,
            logic_threshold: None,
            time_unit: TimeUnit::default(),
        }
    }
}

/// Clock/enable/output analysis: cycle delays and clock-to-output propagation delays.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockCycleConfig {
    pub channels: ChannelMap,
    /// Edge of the enable signal that starts a cycle count.
    pub trigger_edge: EdgeDirection,
    /// Edge of the clock signal that starts a propagation measurement.
    pub reference_edge: EdgeDirection,
    /// Inclusive bounds for clock-to-output delays, in `capture.time_unit`.
    pub plausibility: PlausibilityWindow,
}

impl Default for ClockCycleConfig {
    fn default() -> Self {
        Self {
            channels: ChannelMap::clock_cycle_default(),
            trigger_edge: EdgeDirection::Falling,
            reference_edge: EdgeDirection::Rising,
            plausibility: PlausibilityWindow::new(
                DEFAULT_PLAUSIBLE_DELAY_MIN,
                DEFAULT_PLAUSIBLE_DELAY_MAX,
            ),
        }
    }
}

/// Input/output buffer analysis: paired-edge propagation delays.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropagationConfig {
    pub channels: ChannelMap,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            channels: ChannelMap::propagation_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub capture: CaptureConfig,
    pub clock_cycle: ClockCycleConfig,
    pub propagation: PropagationConfig,
    pub device_id: DeviceIdRule,
    pub return_loss: ReturnLossConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> AnalysisResult<Self> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if let Some(rate) = self.capture.sample_rate_hz {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "capture.sample_rate_hz must be positive, got {rate}"
                )));
            }
        }
        if !self.capture.delimiter.is_ascii() {
            return Err(AnalysisError::InvalidConfig(format!(
                "capture.delimiter must be a single ASCII character, got '{}'",
                self.capture.delimiter
            )));
        }
        let window = &self.clock_cycle.plausibility;
        if !(window.min <= window.max) {
            return Err(AnalysisError::InvalidConfig(format!(
                "clock_cycle.plausibility min ({}) exceeds max ({})",
                window.min, window.max
            )));
        }
        self.clock_cycle.channels.validate()?;
        self.propagation.channels.validate()?;
        if self.device_id.delimiter.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "device_id.delimiter must not be empty".to_string(),
            ));
        }
        if self.return_loss.categories.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "return_loss.categories must list at least one category".to_string(),
            ));
        }
        Ok(())
    }
}
