// src/constants.rs

use plotters::style::colors::full_palette::{AMBER, BLUE, LIGHTBLUE, ORANGE, RED};
use plotters::style::RGBColor;

// Capture file layout defaults.
pub const DEFAULT_HEADER_ROWS: usize = 8;
pub const DEFAULT_CSV_DELIMITER: char = ',';
pub const CAPTURE_FILE_EXTENSION: &str = "csv";

// Clock-to-output delays outside this window (in the configured time unit) are
// treated as measurement artifacts.
pub const DEFAULT_PLAUSIBLE_DELAY_MIN: f64 = 3.0;
pub const DEFAULT_PLAUSIBLE_DELAY_MAX: f64 = 8.0;

// Device id is the token at this position after splitting the file stem.
pub const DEFAULT_DEVICE_ID_DELIMITER: &str = "_";
pub const DEFAULT_DEVICE_ID_INDEX: usize = 1;
pub const UNKNOWN_DEVICE_ID: &str = "unknown";

// Return-loss file selection.
pub const TOUCHSTONE_EXTENSION: &str = "s1p";
pub const RETURN_LOSS_REQUIRED_SUBSTRING: &str = "FPGA";
pub const TOUCHSTONE_DEFAULT_Z0_OHMS: f64 = 50.0;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1600;
pub const PLOT_HEIGHT: u32 = 960;

// Font sizes
pub const FONT_SIZE_MAIN_TITLE: i32 = 24;
pub const FONT_SIZE_CHART_TITLE: i32 = 20;
pub const FONT_SIZE_AXIS_LABEL: i32 = 14;
pub const FONT_SIZE_LEGEND: i32 = 14;
pub const FONT_SIZE_MESSAGE: i32 = 20;

// --- Plot Color Assignments ---
pub const COLOR_CYCLE_DELAY: &RGBColor = &LIGHTBLUE;
pub const COLOR_PROP_DELAY_BOX: &RGBColor = &ORANGE;
pub const COLOR_EDGE_DELAY_RISING: &RGBColor = &BLUE;
pub const COLOR_EDGE_DELAY_FALLING: &RGBColor = &AMBER;
pub const COLOR_MEAN_MARKER: &RGBColor = &RED;

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 1;
pub const LINE_WIDTH_LEGEND: u32 = 2;

// Scatter marker radius in pixels and fill opacity.
pub const SCATTER_MARKER_SIZE: i32 = 5;
pub const SCATTER_MARKER_OPACITY: f64 = 0.6;

// Cycle-count plots never show a y range narrower than this many cycles.
pub const CYCLE_PLOT_MIN_SPAN: f64 = 4.0;

// src/constants.rs
