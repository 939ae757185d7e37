// src/data_input/capture_data.rs

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, ArrayView1};
use serde::Deserialize;

use crate::error::{AnalysisError, AnalysisResult};

/// Logical signals a capture column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Time,
    Input,
    Output,
    Enable,
    Clock,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Time => "time",
            Channel::Input => "input",
            Channel::Output => "output",
            Channel::Enable => "enable",
            Channel::Clock => "clock",
        };
        write!(f, "{name}")
    }
}

/// Column layout of a capture file: which zero-based column holds which signal.
/// Unmapped signals are simply not loaded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelMap {
    pub time: Option<usize>,
    pub input: Option<usize>,
    pub output: Option<usize>,
    pub enable: Option<usize>,
    pub clock: Option<usize>,
}

impl ChannelMap {
    /// Layout of the clock/enable/output captures: time, -, enable, output, clock.
    pub fn clock_cycle_default() -> Self {
        Self {
            time: Some(0),
            enable: Some(2),
            output: Some(3),
            clock: Some(4),
            ..Default::default()
        }
    }

    /// Layout of the input/output buffer captures: time, input, output.
    pub fn propagation_default() -> Self {
        Self {
            time: Some(0),
            input: Some(1),
            output: Some(2),
            ..Default::default()
        }
    }

    pub fn column(&self, channel: Channel) -> Option<usize> {
        match channel {
            Channel::Time => self.time,
            Channel::Input => self.input,
            Channel::Output => self.output,
            Channel::Enable => self.enable,
            Channel::Clock => self.clock,
        }
    }

    /// Mapped value channels (everything except time), with their columns.
    pub fn value_channels(&self) -> Vec<(Channel, usize)> {
        [Channel::Input, Channel::Output, Channel::Enable, Channel::Clock]
            .into_iter()
            .filter_map(|ch| self.column(ch).map(|col| (ch, col)))
            .collect()
    }

    /// Highest mapped column index; rows shorter than this cannot be used.
    pub fn max_column(&self) -> Option<usize> {
        self.time
            .into_iter()
            .chain(self.value_channels().into_iter().map(|(_, col)| col))
            .max()
    }

    /// Rejects layouts where two channels share a column.
    pub fn validate(&self) -> AnalysisResult<()> {
        let mut seen: BTreeMap<usize, Channel> = BTreeMap::new();
        let all = self
            .time
            .map(|col| (Channel::Time, col))
            .into_iter()
            .chain(self.value_channels());
        for (channel, col) in all {
            if let Some(previous) = seen.insert(col, channel) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "channels '{previous}' and '{channel}' both map to column {col}"
                )));
            }
        }
        Ok(())
    }
}

/// One parsed capture: a shared time axis (seconds) and one value column per mapped channel.
#[derive(Debug, Clone)]
pub struct CaptureData {
    pub time_sec: Array1<f64>,
    pub channels: BTreeMap<Channel, Array1<f64>>,
}

impl CaptureData {
    pub fn len(&self) -> usize {
        self.time_sec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_sec.is_empty()
    }

    /// Borrowed view of one channel over the shared time axis.
    pub fn trace(&self, channel: Channel) -> AnalysisResult<SignalTrace<'_>> {
        let values = self
            .channels
            .get(&channel)
            .ok_or(AnalysisError::ChannelNotMapped(channel))?;
        Ok(SignalTrace {
            channel,
            time: self.time_sec.view(),
            values: values.view(),
        })
    }
}

/// Ordered (time, value) samples for one logical signal.
#[derive(Debug, Clone, Copy)]
pub struct SignalTrace<'a> {
    pub channel: Channel,
    pub time: ArrayView1<'a, f64>,
    pub values: ArrayView1<'a, f64>,
}

impl<'a> SignalTrace<'a> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn time_at(&self, index: usize) -> Option<f64> {
        self.time.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn duplicate_columns_are_rejected() {
        let map = ChannelMap {
            time: Some(0),
            input: Some(1),
            output: Some(1),
            ..Default::default()
        };
        assert!(matches!(map.validate(), Err(AnalysisError::InvalidConfig(_))));
        assert!(ChannelMap::clock_cycle_default().validate().is_ok());
    }

    #[test]
    fn max_column_covers_time_and_values() {
        assert_eq!(ChannelMap::clock_cycle_default().max_column(), Some(4));
        assert_eq!(ChannelMap::propagation_default().max_column(), Some(2));
        assert_eq!(ChannelMap::default().max_column(), None);
    }

    #[test]
    fn unmapped_trace_is_an_error() {
        let mut channels = BTreeMap::new();
        channels.insert(Channel::Clock, array![0.0, 1.0]);
        let capture = CaptureData {
            time_sec: array![0.0, 1e-9],
            channels,
        };
        let clock = capture.trace(Channel::Clock).unwrap();
        assert_eq!(clock.len(), 2);
        assert_eq!(clock.time_at(1), Some(1e-9));
        assert!(matches!(
            capture.trace(Channel::Enable),
            Err(AnalysisError::ChannelNotMapped(Channel::Enable))
        ));
    }
}
