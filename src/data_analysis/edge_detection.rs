// src/data_analysis/edge_detection.rs

use std::fmt;

use ndarray::ArrayView1;
use serde::Deserialize;

use crate::data_input::capture_data::SignalTrace;

/// Direction of a logic-level transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    /// 0 -> 1
    Rising,
    /// 1 -> 0
    Falling,
}

impl EdgeDirection {
    pub const BOTH: [EdgeDirection; 2] = [EdgeDirection::Rising, EdgeDirection::Falling];

    /// Sample-to-sample difference that marks this transition.
    fn step(self) -> f64 {
        match self {
            EdgeDirection::Rising => 1.0,
            EdgeDirection::Falling => -1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EdgeDirection::Rising => "Rising",
            EdgeDirection::Falling => "Falling",
        }
    }
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A detected transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Index of the first sample at the new level.
    pub index: usize,
    pub time: f64,
    pub direction: EdgeDirection,
}

/// Lazy iterator over edge indices of one direction.
///
/// Cheap to clone; cloning (or calling [`find_edges`] again) restarts the scan.
#[derive(Debug, Clone)]
pub struct Edges<'a> {
    values: ArrayView1<'a, f64>,
    next: usize,
    direction: EdgeDirection,
}

impl Iterator for Edges<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let step = self.direction.step();
        while self.next < self.values.len() {
            let i = self.next;
            self.next += 1;
            if self.values[i] - self.values[i - 1] == step {
                return Some(i);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.values.len().saturating_sub(self.next)))
    }
}

/// Indices `i` where `values[i] - values[i-1]` equals +1 (rising) or -1 (falling).
/// The first sample has no predecessor and is never an edge.
pub fn find_edges(values: ArrayView1<'_, f64>, direction: EdgeDirection) -> Edges<'_> {
    Edges {
        values,
        next: 1,
        direction,
    }
}

/// Edges of a trace with their timestamps.
pub fn trace_edges<'a>(
    trace: &SignalTrace<'a>,
    direction: EdgeDirection,
) -> impl Iterator<Item = Edge> + 'a {
    let time = trace.time;
    find_edges(trace.values, direction).map(move |index| Edge {
        index,
        time: time[index],
        direction,
    })
}

/// Timestamps of the edges of one direction.
pub fn edge_times(trace: &SignalTrace<'_>, direction: EdgeDirection) -> Vec<f64> {
    trace_edges(trace, direction).map(|edge| edge.time).collect()
}
