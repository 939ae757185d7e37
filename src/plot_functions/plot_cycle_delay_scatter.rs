// src/plot_functions/plot_cycle_delay_scatter.rs

use std::path::Path;

use crate::constants::{COLOR_CYCLE_DELAY, CYCLE_PLOT_MIN_SPAN};
use crate::data_analysis::aggregation::DeviceRecords;
use crate::plot_framework::{draw_category_scatter, render_figure, value_range, CategoryChart, ScatterSeries};
use crate::types::{CategoryPoints, PlotResult};

/// Scatter of enable-to-output delays in whole clock cycles, one column per device.
pub fn plot_cycle_delay_scatter(
    cycle_delays: &DeviceRecords<i64>,
    output_dir: &Path,
    root_name: &str,
) -> PlotResult {
    let output_file = output_dir.join(format!("{root_name}_cycle_delay_scatter.png"));
    let plot_type_name = "Clock Cycle Delay";

    let categories: Vec<String> = cycle_delays.device_ids().map(str::to_string).collect();
    let mut points: CategoryPoints = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    for (idx, record) in cycle_delays.iter().enumerate() {
        for &cycles in &record.values {
            points.push((idx, cycles as f64));
            values.push(cycles as f64);
        }
    }

    let y_range = value_range(&values).map(|r| widen_to(r, CYCLE_PLOT_MIN_SPAN));
    let unavailable = match y_range {
        None => Some("No cycle delays measured"),
        Some(_) => None,
    };

    render_figure(&output_file, root_name, plot_type_name, unavailable, |area| {
        let spec = CategoryChart {
            title: "HWT detection: enable to output delay".to_string(),
            categories,
            y_range: y_range.unwrap_or(0.0..1.0),
            x_label: "Device ID".to_string(),
            y_label: "Clock cycles delayed".to_string(),
        };
        let series = [ScatterSeries {
            points,
            label: String::new(),
            color: *COLOR_CYCLE_DELAY,
        }];
        draw_category_scatter(area, &spec, &series, 0)
    })
}

/// Grows `range` symmetrically to at least `min_span`.
fn widen_to(range: std::ops::Range<f64>, min_span: f64) -> std::ops::Range<f64> {
    let span = range.end - range.start;
    if span >= min_span {
        return range;
    }
    let centre = (range.start + range.end) / 2.0;
    (centre - min_span / 2.0)..(centre + min_span / 2.0)
}


// src/plot_functions/plot_cycle_delay_scatter.rs
