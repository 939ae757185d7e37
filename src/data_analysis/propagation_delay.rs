// src/data_analysis/propagation_delay.rs

use ndarray::ArrayView1;
use serde::Deserialize;

use crate::config::TimeUnit;
use crate::data_analysis::edge_detection::{edge_times, find_edges, EdgeDirection};
use crate::data_input::capture_data::SignalTrace;

/// Inclusive bounds on physically plausible delays, in the reporting time unit.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlausibilityWindow {
    pub min: f64,
    pub max: f64,
}

impl PlausibilityWindow {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Keeps values inside the window, in order. Rejected values are dropped silently.
    pub fn apply(&self, values: impl IntoIterator<Item = f64>) -> Vec<f64> {
        values.into_iter().filter(|&v| self.contains(v)).collect()
    }
}

/// Index of the first response change strictly after `start`.
///
/// Scans `|values[j] - values[j-1]|` for `j > start` and returns the first position of
/// the largest step. `None` when nothing follows `start` or the signal never moves.
/// Non-finite steps count as no change. Use [`ChangeIndex`] when querying many starts.
pub fn first_change_after(values: ArrayView1<'_, f64>, start: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for j in (start + 1)..values.len() {
        let step = finite_step(values, j);
        match best {
            Some((_, best_step)) if step <= best_step => {}
            _ => best = Some((j, step)),
        }
    }
    best.filter(|&(_, step)| step > 0.0).map(|(j, _)| j)
}

fn finite_step(values: ArrayView1<'_, f64>, j: usize) -> f64 {
    let step = (values[j] - values[j - 1]).abs();
    if step.is_finite() {
        step
    } else {
        0.0
    }
}

/// Suffix table answering [`first_change_after`] in constant time per query.
///
/// `best_from[j]` holds the earliest index of the largest step among `j..len`.
#[derive(Debug, Clone)]
pub struct ChangeIndex {
    best_from: Vec<Option<(usize, f64)>>,
}

impl ChangeIndex {
    pub fn new(values: ArrayView1<'_, f64>) -> Self {
        let n = values.len();
        let mut best_from = vec![None; n + 1];
        for j in (1..n).rev() {
            let step = finite_step(values, j);
            best_from[j] = match best_from[j + 1] {
                Some((_, later)) if later > step => best_from[j + 1],
                _ => Some((j, step)),
            };
        }
        Self { best_from }
    }

    /// Same result as `first_change_after(values, start)` on the indexed trace.
    pub fn after(&self, start: usize) -> Option<usize> {
        let (j, step) = (*self.best_from.get(start.checked_add(1)?)?)?;
        (step > 0.0).then_some(j)
    }
}

/// For every `direction` edge of `reference`, the delay until `response` next changes.
///
/// Delays are in `unit`. Edges with no later response change contribute nothing, and
/// negative delays (misaligned time axes) are discarded.
pub fn propagation_delays(
    reference: &SignalTrace<'_>,
    response: &SignalTrace<'_>,
    direction: EdgeDirection,
    unit: TimeUnit,
) -> Vec<f64> {
    let scale = unit.scale();
    let changes = ChangeIndex::new(response.values);
    find_edges(reference.values, direction)
        .filter_map(|edge_idx| {
            let t0 = reference.time_at(edge_idx)?;
            let change_idx = changes.after(edge_idx)?;
            let t_change = response.time_at(change_idx)?;
            Some((t_change - t0) * scale)
        })
        .filter(|&delay| delay >= 0.0)
        .collect()
}

/// Pairs the n-th `direction` edge of `reference` with the n-th of `response`.
///
/// Only the overlapping prefix is paired; surplus edges on either side are dropped.
/// Negative delays are discarded.
pub fn paired_edge_delays(
    reference: &SignalTrace<'_>,
    response: &SignalTrace<'_>,
    direction: EdgeDirection,
    unit: TimeUnit,
) -> Vec<f64> {
    let scale = unit.scale();
    let reference_times = edge_times(reference, direction);
    let response_times = edge_times(response, direction);
    reference_times
        .iter()
        .zip(&response_times)
        .map(|(t_ref, t_resp)| (t_resp - t_ref) * scale)
        .filter(|&delay| delay >= 0.0)
        .collect()
}

/// Mean paired-edge delay of one capture, per edge direction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeDelaySummary {
    pub rising: Option<f64>,
    pub falling: Option<f64>,
}

impl EdgeDelaySummary {
    pub fn get(&self, direction: EdgeDirection) -> Option<f64> {
        match direction {
            EdgeDirection::Rising => self.rising,
            EdgeDirection::Falling => self.falling,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rising.is_none() && self.falling.is_none()
    }
}

pub fn edge_delay_summary(
    reference: &SignalTrace<'_>,
    response: &SignalTrace<'_>,
    unit: TimeUnit,
) -> EdgeDelaySummary {
    let mean_for = |direction| mean(&paired_edge_delays(reference, response, direction, unit));
    EdgeDelaySummary {
        rising: mean_for(EdgeDirection::Rising),
        falling: mean_for(EdgeDirection::Falling),
    }
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    ArrayView1::from(values).mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::capture_data::Channel;
    use ndarray::{array, Array1};

    fn trace<'a>(time: &'a Array1<f64>, values: &'a Array1<f64>) -> SignalTrace<'a> {
        SignalTrace {
            channel: Channel::Output,
            time: time.view(),
            values: values.view(),
        }
    }

    fn ns_axis(n: usize) -> Array1<f64> {
        Array1::from_iter((0..n).map(|i| i as f64 * 1e-9))
    }

    #[test]
    fn plausibility_window_is_inclusive() {
        let window = PlausibilityWindow::new(3.0, 8.0);
        assert_eq!(window.apply([1.0, 4.0, 7.0, 9.0]), vec![4.0, 7.0]);
        assert_eq!(window.apply([3.0, 8.0]), vec![3.0, 8.0]);
        assert!(window.apply(Vec::new()).is_empty());
    }

    #[test]
    fn first_change_after_skips_start_sample() {
        let v = array![0.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        assert_eq!(first_change_after(v.view(), 1), Some(4));
        assert_eq!(first_change_after(v.view(), 0), Some(1));
        assert_eq!(first_change_after(v.view(), 4), None);
        assert_eq!(first_change_after(v.view(), 5), None);
        assert_eq!(first_change_after(v.view(), 99), None);
    }

    #[test]
    fn first_change_prefers_largest_then_earliest() {
        let v = array![0.0, 0.5, 0.5, 1.5, 0.5];
        assert_eq!(first_change_after(v.view(), 0), Some(3));
    }

    #[test]
    fn change_index_matches_linear_scan() {
        // Quantised pseudo-random levels give plenty of tied steps.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let noisy = Array1::from_iter((0..500).map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 7) as f64 * 0.5
        }));
        let digital = array![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let flat = Array1::from_elem(6, 3.3);
        let with_nan = array![0.0, f64::NAN, 0.0, 1.0, 1.0];
        let empty = Array1::<f64>::zeros(0);

        for values in [&noisy, &digital, &flat, &with_nan, &empty] {
            let index = ChangeIndex::new(values.view());
            for start in 0..values.len() + 2 {
                assert_eq!(
                    index.after(start),
                    first_change_after(values.view(), start),
                    "start {start} of {} samples",
                    values.len()
                );
            }
        }
        assert_eq!(ChangeIndex::new(digital.view()).after(usize::MAX), None);
    }

    #[test]
    fn long_capture_with_many_edges() {
        // 200k samples, 10k rising clock edges, output toggling every 20 samples.
        let n = 200_000;
        let time = ns_axis(n);
        let clock = Array1::from_iter((0..n).map(|i| if i % 20 < 10 { 0.0 } else { 1.0 }));
        let output = Array1::from_iter((0..n).map(|i| if (i + 6) % 40 < 20 { 0.0 } else { 1.0 }));
        let delays = propagation_delays(
            &trace(&time, &clock),
            &trace(&time, &output),
            EdgeDirection::Rising,
            TimeUnit::Nanoseconds,
        );
        // Output changes at 14, 34, 54, ...; clock rises at 10, 30, 50, ...
        assert_eq!(delays.len(), n / 20);
        assert!(delays.iter().all(|d| (d - 4.0).abs() < 1e-6));
    }

    #[test]
    fn single_edge_single_response_gives_known_offset() {
        let time = ns_axis(10);
        let clock = array![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let output = array![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let delays = propagation_delays(
            &trace(&time, &clock),
            &trace(&time, &output),
            EdgeDirection::Rising,
            TimeUnit::Nanoseconds,
        );
        assert_eq!(delays.len(), 1);
        assert!((delays[0] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn no_transitions_means_no_measurements() {
        let time = ns_axis(6);
        let flat = Array1::zeros(6);
        let reference = trace(&time, &flat);
        let response = trace(&time, &flat);
        assert!(propagation_delays(&reference, &response, EdgeDirection::Rising, TimeUnit::Nanoseconds).is_empty());
        assert!(paired_edge_delays(&reference, &response, EdgeDirection::Falling, TimeUnit::Nanoseconds).is_empty());
        assert!(edge_delay_summary(&reference, &response, TimeUnit::Nanoseconds).is_empty());
    }

    #[test]
    fn edge_without_later_change_is_dropped() {
        let time = ns_axis(6);
        let clock = array![0.0, 1.0, 1.0, 1.0, 0.0, 1.0];
        let output = array![0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let delays = propagation_delays(
            &trace(&time, &clock),
            &trace(&time, &output),
            EdgeDirection::Rising,
            TimeUnit::Nanoseconds,
        );
        assert_eq!(delays.len(), 1);
        assert!((delays[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pairing_uses_overlapping_prefix() {
        let time = ns_axis(12);
        let input = array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let output = array![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let delays = paired_edge_delays(
            &trace(&time, &input),
            &trace(&time, &output),
            EdgeDirection::Rising,
            TimeUnit::Nanoseconds,
        );
        // Input rises at 1, 3, 5; output at 3, 6 -> pairs (1,3), (3,6).
        assert_eq!(delays.len(), 2);
        assert!((delays[0] - 2.0).abs() < 1e-9);
        assert!((delays[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn negative_delays_are_never_reported() {
        let time = ns_axis(8);
        // Output leads input: every pairing is negative.
        let input = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let output = array![0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let reference = trace(&time, &input);
        let response = trace(&time, &output);
        assert!(paired_edge_delays(&reference, &response, EdgeDirection::Rising, TimeUnit::Nanoseconds).is_empty());
        let summary = edge_delay_summary(&reference, &response, TimeUnit::Nanoseconds);
        assert_eq!(summary.rising, None);
        assert_eq!(summary.falling, None);
    }

    #[test]
    fn summary_averages_each_direction() {
        let time = ns_axis(12);
        let input = array![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let output = array![0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        let summary = edge_delay_summary(&trace(&time, &input), &trace(&time, &output), TimeUnit::Nanoseconds);
        // Rising: in 1,5 / out 2,7 -> 1, 2. Falling: in 3,7 / out 5,10 -> 2, 3.
        assert!((summary.get(EdgeDirection::Rising).unwrap() - 1.5).abs() < 1e-9);
        assert!((summary.get(EdgeDirection::Falling).unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }
}
