// src/plot_functions/plot_propagation_boxplot.rs

use std::path::Path;

use crate::config::TimeUnit;
use crate::constants::COLOR_PROP_DELAY_BOX;
use crate::data_analysis::aggregation::DeviceRecords;
use crate::plot_framework::{draw_box_plot, render_figure, value_range, CategoryChart};
use crate::types::{CategoryValues, PlotResult};

/// Box plot of clock-to-output propagation delays per device.
pub fn plot_propagation_boxplot(
    delays: &DeviceRecords<f64>,
    unit: TimeUnit,
    output_dir: &Path,
    root_name: &str,
) -> PlotResult {
    let output_file = output_dir.join(format!("{root_name}_propagation_delay_boxplot.png"));
    let plot_type_name = "Propagation Delay";

    let per_device: CategoryValues = delays
        .iter()
        .map(|r| (r.device_id.clone(), r.values.clone()))
        .collect();
    let y_range = value_range(per_device.iter().flat_map(|(_, v)| v.iter()));
    let unavailable = y_range.is_none().then_some("No plausible propagation delays measured");

    render_figure(&output_file, root_name, plot_type_name, unavailable, |area| {
        let (categories, values): (Vec<String>, Vec<Vec<f64>>) = per_device.into_iter().unzip();
        let spec = CategoryChart {
            title: "Clock to output propagation delay by device".to_string(),
            categories,
            y_range: y_range.unwrap_or(0.0..1.0),
            x_label: "Device ID".to_string(),
            y_label: format!("Propagation delay ({})", unit.suffix()),
        };
        draw_box_plot(area, &spec, &values, *COLOR_PROP_DELAY_BOX)
    })
}

// src/plot_functions/plot_propagation_boxplot.rs
