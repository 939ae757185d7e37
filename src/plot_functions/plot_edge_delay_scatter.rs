// src/plot_functions/plot_edge_delay_scatter.rs

use std::path::Path;

use plotters::style::RGBColor;

use crate::batch::EdgeDelayRecords;
use crate::config::TimeUnit;
use crate::constants::{COLOR_EDGE_DELAY_FALLING, COLOR_EDGE_DELAY_RISING};
use crate::data_analysis::edge_detection::EdgeDirection;
use crate::plot_framework::{draw_category_scatter, render_figure, value_range, CategoryChart, ScatterSeries};
use crate::report::edge_delay_points;
use crate::types::PlotResult;

/// Per-file mean rising and falling input-to-output delays, grouped by device.
/// Devices lacking either direction are left out.
pub fn plot_edge_delay_scatter(
    records: &EdgeDelayRecords,
    unit: TimeUnit,
    output_dir: &Path,
    root_name: &str,
) -> PlotResult {
    let output_file = output_dir.join(format!("{root_name}_edge_delay_scatter.png"));
    let plot_type_name = "Edge Propagation Delay";

    let points = edge_delay_points(records);
    let all_delays: Vec<f64> = points.values().collect();
    let y_range = value_range(&all_delays);
    let unavailable = y_range
        .is_none()
        .then_some("No device has both rising and falling edge delays");

    render_figure(&output_file, root_name, plot_type_name, unavailable, |area| {
        let series_for = |direction: EdgeDirection, color: &RGBColor| ScatterSeries {
            points: match direction {
                EdgeDirection::Rising => points.rising.clone(),
                EdgeDirection::Falling => points.falling.clone(),
            },
            label: format!("{direction} edge"),
            color: *color,
        };
        let series = [
            series_for(EdgeDirection::Rising, COLOR_EDGE_DELAY_RISING),
            series_for(EdgeDirection::Falling, COLOR_EDGE_DELAY_FALLING),
        ];
        let spec = CategoryChart {
            title: "Average input to output delay by edge".to_string(),
            categories: points.devices.clone(),
            y_range: y_range.unwrap_or(0.0..1.0),
            x_label: "Device ID".to_string(),
            y_label: format!("Average delay ({})", unit.suffix()),
        };
        draw_category_scatter(area, &spec, &series, 2)
    })
}

// src/plot_functions/plot_edge_delay_scatter.rs
