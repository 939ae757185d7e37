// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::coord::Shift;
use plotters::data::Quartiles;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Boxplot, Circle, Cross, PathElement, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::ops::Range;
use std::path::Path;

use crate::constants::{
    COLOR_MEAN_MARKER, FONT_SIZE_MESSAGE, LINE_WIDTH_LEGEND, PLOT_HEIGHT, PLOT_WIDTH,
    SCATTER_MARKER_OPACITY, SCATTER_MARKER_SIZE,
};
use crate::font_config::{
    FONT_TUPLE_AXIS_LABEL, FONT_TUPLE_CHART_TITLE, FONT_TUPLE_LEGEND, FONT_TUPLE_MAIN_TITLE,
    FONT_TUPLE_MESSAGE,
};
use crate::types::{CategoryPoints, PlotResult};

pub type PlotArea<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Padded range over every finite value, `None` when there is none.
pub fn value_range<'a, I>(values: I) -> Option<Range<f64>>
where
    I: IntoIterator<Item = &'a f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        return None;
    }
    let (lo, hi) = calculate_range(min, max);
    Some(lo..hi)
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(area: &PlotArea<'_>, plot_type: &str, reason: &str) -> PlotResult {
    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (x_range.end - x_range.start, y_range.end - y_range.start);
    let message = format!("{plot_type} Data Unavailable:\n{reason}");

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;
    let lines: Vec<&str> = message.split('\n').collect();
    let max_line_length = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let estimated_text_width = max_line_length.saturating_mul(estimated_char_width as usize) as i32;
    let estimated_text_height = lines.len().saturating_mul(estimated_line_height as usize) as i32;

    let origin = (
        width / 2 - estimated_text_width / 2,
        height / 2 - estimated_text_height / 2,
    );
    let text_style = FONT_TUPLE_MESSAGE.into_font().color(&RED);
    for (i, line) in lines.iter().enumerate() {
        let y = origin.1 + i as i32 * estimated_line_height;
        area.draw(&Text::new(line.to_string(), (origin.0, y), text_style.clone()))?;
    }
    Ok(())
}

/// Opens a PNG, writes the figure title and either the chart or a placeholder.
///
/// `unavailable` short-circuits the chart: the reason is rendered instead and
/// `draw_chart` is never called.
pub fn render_figure<F>(
    output_path: &Path,
    main_title: &str,
    plot_type: &str,
    unavailable: Option<&str>,
    draw_chart: F,
) -> PlotResult
where
    F: FnOnce(&PlotArea<'_>) -> PlotResult,
{
    let root_area = BitMapBackend::new(output_path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;
    root_area.draw(&Text::new(
        main_title,
        (10, 10),
        FONT_TUPLE_MAIN_TITLE.into_font().color(&BLACK),
    ))?;
    let chart_area = root_area.margin(50, 5, 5, 5);

    match unavailable {
        Some(reason) => {
            draw_unavailable_message(&chart_area, plot_type, reason)?;
            root_area.present()?;
            println!(
                "  {plot_type} plot saved as '{}' (placeholder only: {reason}).",
                output_path.display()
            );
        }
        None => {
            draw_chart(&chart_area)?;
            root_area.present()?;
            println!("  {plot_type} plot saved as '{}'.", output_path.display());
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct PlotSeries {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
}

impl PlotSeries {
    /// A series that only contributes a legend entry.
    pub fn legend_only(label: impl Into<String>, color: RGBColor) -> Self {
        Self {
            data: Vec::new(),
            label: label.into(),
            color,
            stroke_width: LINE_WIDTH_LEGEND,
        }
    }
}

#[derive(Clone)]
pub struct PlotConfig {
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub series: Vec<PlotSeries>,
    pub x_label: String,
    pub y_label: String,
}

/// Draws line series on a numeric chart.
///
/// A series with data but no label is drawn without a legend entry; a series with a
/// label but no data only adds a legend entry. Many curves can share one legend line
/// this way.
pub fn draw_line_chart(area: &PlotArea<'_>, plot_config: &PlotConfig) -> PlotResult {
    let mut chart = ChartBuilder::on(area)
        .caption(&plot_config.title, FONT_TUPLE_CHART_TITLE)
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(plot_config.x_range.clone(), plot_config.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(&plot_config.x_label)
        .y_desc(&plot_config.y_label)
        .x_labels(20)
        .y_labels(10)
        .y_label_formatter(&|y| format!("{y:.0}"))
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    let mut legend_series_count = 0;
    for s in &plot_config.series {
        let color = s.color;
        if s.data.is_empty() {
            if !s.label.is_empty() {
                chart
                    .draw_series(std::iter::once(Circle::new(
                        (plot_config.x_range.start, plot_config.y_range.start),
                        0,
                        color.filled(),
                    )))?
                    .label(&s.label)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
                    });
                legend_series_count += 1;
            }
            continue;
        }

        let series = chart.draw_series(LineSeries::new(
            s.data.iter().cloned(),
            color.stroke_width(s.stroke_width),
        ))?;
        if !s.label.is_empty() {
            series.label(&s.label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
            });
            legend_series_count += 1;
        }
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(FONT_TUPLE_LEGEND)
            .draw()?;
    }
    Ok(())
}

/// Axes shared by charts whose x axis is a list of named categories.
#[derive(Clone)]
pub struct CategoryChart {
    pub title: String,
    pub categories: Vec<String>,
    pub y_range: Range<f64>,
    pub x_label: String,
    pub y_label: String,
}

/// Scatter markers placed at category centres.
#[derive(Clone)]
pub struct ScatterSeries {
    pub points: CategoryPoints,
    pub label: String,
    pub color: RGBColor,
}

/// Integer segments, one per category. Plotters treats integer ranges as inclusive.
fn category_axis(categories: &[String]) -> Range<usize> {
    0..categories.len().saturating_sub(1)
}

fn category_label(categories: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::Exact(idx) | SegmentValue::CenterOf(idx) => {
            categories.get(*idx).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

pub fn draw_category_scatter(
    area: &PlotArea<'_>,
    spec: &CategoryChart,
    series: &[ScatterSeries],
    y_label_precision: usize,
) -> PlotResult {
    let categories = spec.categories.as_slice();
    let mut chart = ChartBuilder::on(area)
        .caption(&spec.title, FONT_TUPLE_CHART_TITLE)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(category_axis(categories).into_segmented(), spec.y_range.clone())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(categories.len())
        .x_label_formatter(&|v| category_label(categories, v))
        .y_label_formatter(&|y| format!("{y:.y_label_precision$}"))
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    let mut legend_series_count = 0;
    for s in series {
        let color = s.color;
        let drawn = chart.draw_series(
            s.points
                .iter()
                .filter(|&&(idx, _)| idx < categories.len())
                .map(|&(idx, y)| {
                    Circle::new(
                        (SegmentValue::CenterOf(idx), y),
                        SCATTER_MARKER_SIZE,
                        color.mix(SCATTER_MARKER_OPACITY).filled(),
                    )
                }),
        )?;
        if !s.label.is_empty() {
            drawn
                .label(&s.label)
                .legend(move |(x, y)| Circle::new((x + 10, y), SCATTER_MARKER_SIZE, color.filled()));
            legend_series_count += 1;
        }
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(FONT_TUPLE_LEGEND)
            .draw()?;
    }
    Ok(())
}

/// One box per category (quartiles with whiskers), plus a cross at the mean.
///
/// `values[i]` belongs to `spec.categories[i]`; empty lists draw nothing.
pub fn draw_box_plot(
    area: &PlotArea<'_>,
    spec: &CategoryChart,
    values: &[Vec<f64>],
    color: RGBColor,
) -> PlotResult {
    let categories = spec.categories.as_slice();
    let y_range = spec.y_range.start as f32..spec.y_range.end as f32;
    let mut chart = ChartBuilder::on(area)
        .caption(&spec.title, FONT_TUPLE_CHART_TITLE)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(category_axis(categories).into_segmented(), y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(categories.len())
        .x_label_formatter(&|v| category_label(categories, v))
        .y_label_formatter(&|y| format!("{y:.2}"))
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    let boxes: Vec<(usize, &Vec<f64>)> = values
        .iter()
        .take(categories.len())
        .enumerate()
        .filter(|(_, v)| !v.is_empty())
        .collect();

    chart.draw_series(boxes.iter().map(|&(idx, v)| {
        Boxplot::new_vertical(SegmentValue::CenterOf(idx), &Quartiles::new(v))
            .width(30)
            .whisker_width(0.5)
            .style(color.stroke_width(2))
    }))?;

    chart.draw_series(boxes.iter().map(|&(idx, v)| {
        let mean = v.iter().sum::<f64>() / v.len() as f64;
        Cross::new(
            (SegmentValue::CenterOf(idx), mean as f32),
            4,
            COLOR_MEAN_MARKER.stroke_width(2),
        )
    }))?;
    Ok(())
}


// src/plot_framework.rs
