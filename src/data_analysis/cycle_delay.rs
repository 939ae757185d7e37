// src/data_analysis/cycle_delay.rs

use crate::data_analysis::edge_detection::{edge_times, find_edges, EdgeDirection};
use crate::data_analysis::propagation_delay::ChangeIndex;
use crate::data_input::capture_data::SignalTrace;
use crate::error::{AnalysisError, AnalysisResult};

/// Median spacing of consecutive rising clock edges, in seconds.
///
/// The median tolerates the odd missing or spurious edge that would skew a mean.
pub fn estimate_clock_period(clock: &SignalTrace<'_>) -> AnalysisResult<f64> {
    let rising = edge_times(clock, EdgeDirection::Rising);
    if rising.len() < 2 {
        return Err(AnalysisError::InsufficientClockEdges {
            found: rising.len(),
        });
    }
    let mut periods: Vec<f64> = rising.windows(2).map(|w| w[1] - w[0]).collect();
    let period = median(&mut periods).ok_or(AnalysisError::InsufficientClockEdges { found: rising.len() })?;
    if !period.is_finite() || period <= 0.0 {
        return Err(AnalysisError::DegenerateClockPeriod(period));
    }
    Ok(period)
}

/// Median of `values` (mean of the two middle values for even counts). Sorts in place.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Nearest whole number of cycles; exact halves round away from zero (2.5 -> 3, -2.5 -> -3).
pub fn round_cycles(ratio: f64) -> i64 {
    ratio.round() as i64
}

/// Delay from each `direction` edge of `trigger` to the next `response` change,
/// counted in whole clock periods.
///
/// Triggers with no later response change emit nothing; so do negative offsets.
pub fn cycle_delays(
    trigger: &SignalTrace<'_>,
    response: &SignalTrace<'_>,
    clock_period_s: f64,
    direction: EdgeDirection,
) -> Vec<i64> {
    let changes = ChangeIndex::new(response.values);
    find_edges(trigger.values, direction)
        .filter_map(|edge_idx| {
            let t0 = trigger.time_at(edge_idx)?;
            let change_idx = changes.after(edge_idx)?;
            let elapsed = response.time_at(change_idx)? - t0;
            (elapsed >= 0.0).then(|| round_cycles(elapsed / clock_period_s))
        })
        .collect()
}

/// Cycle delays for one capture, estimating the period from `clock` first.
pub fn clock_cycle_delays(
    clock: &SignalTrace<'_>,
    trigger: &SignalTrace<'_>,
    response: &SignalTrace<'_>,
    direction: EdgeDirection,
) -> AnalysisResult<Vec<i64>> {
    let period = estimate_clock_period(clock)?;
    Ok(cycle_delays(trigger, response, period, direction))
}
