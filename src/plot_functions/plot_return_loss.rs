// src/plot_functions/plot_return_loss.rs

use std::ops::Range;
use std::path::Path;

use plotters::style::RGBColor;

use crate::constants::LINE_WIDTH_PLOT;
use crate::data_analysis::return_loss::{ReturnLossConfig, ReturnLossSet};
use crate::plot_framework::{calculate_range, draw_line_chart, render_figure, PlotConfig, PlotSeries};
use crate::types::PlotResult;

const HZ_PER_GHZ: f64 = 1e9;

/// Curves in GHz with their category colour, one legend entry per configured category.
struct ReturnLossSeries {
    series: Vec<PlotSeries>,
    /// Frequency (GHz) and dB extents; `None` when no curve has a point.
    bounds: Option<(Range<f64>, Range<f64>)>,
}

fn return_loss_series(set: &ReturnLossSet, config: &ReturnLossConfig) -> ReturnLossSeries {
    let mut series: Vec<PlotSeries> = Vec::new();
    let (mut f_min, mut f_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut db_min, mut db_max) = (f64::INFINITY, f64::NEG_INFINITY);

    for (category_idx, category) in config.categories.iter().enumerate() {
        let [r, g, b] = category.color;
        let color = RGBColor(r, g, b);
        for curve in set.curves_in(category_idx) {
            let data: Vec<(f64, f64)> = curve
                .points
                .iter()
                .map(|&(hz, db)| (hz / HZ_PER_GHZ, db))
                .collect();
            for &(f, db) in &data {
                f_min = f_min.min(f);
                f_max = f_max.max(f);
                db_min = db_min.min(db);
                db_max = db_max.max(db);
            }
            series.push(PlotSeries {
                data,
                label: String::new(),
                color,
                stroke_width: LINE_WIDTH_PLOT,
            });
        }
        series.push(PlotSeries::legend_only(category.label.clone(), color));
    }

    let bounds = (f_min <= f_max).then(|| (f_min..f_max, db_min..db_max));
    ReturnLossSeries { series, bounds }
}

/// S11 magnitude in dB against frequency, every file drawn in its category colour.
///
/// The legend always lists every configured category, in configuration order.
pub fn plot_return_loss(
    set: &ReturnLossSet,
    config: &ReturnLossConfig,
    output_dir: &Path,
    root_name: &str,
) -> PlotResult {
    let output_file = output_dir.join(format!("{root_name}_return_loss.png"));
    let plot_type_name = "Return Loss";

    let ReturnLossSeries { series, bounds } = return_loss_series(set, config);
    let unavailable = bounds.is_none().then_some("No return-loss curves loaded");

    render_figure(&output_file, root_name, plot_type_name, unavailable, |area| {
        let (freq, db) = bounds.unwrap_or((0.0..1.0, 0.0..1.0));
        // Frequency axis stays tight; only the dB axis is padded.
        let x_range = if freq.end > freq.start {
            freq
        } else {
            freq.start - 0.5..freq.end + 0.5
        };
        let (y_lo, y_hi) = calculate_range(db.start, db.end);
        let plot_config = PlotConfig {
            title: "Return loss (S11)".to_string(),
            x_range,
            y_range: y_lo..y_hi,
            series,
            x_label: "Frequency (GHz)".to_string(),
            y_label: "S11 (dB)".to_string(),
        };
        draw_line_chart(area, &plot_config)
    })
}


// src/plot_functions/plot_return_loss.rs
