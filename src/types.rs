// src/types.rs
// Type aliases shared by the plotting layer

use std::error::Error;

/// Outcome of rendering one figure.
pub type PlotResult = Result<(), Box<dyn Error>>;

/// One value list per category, in x-axis order: `(category label, values)`.
pub type CategoryValues = Vec<(String, Vec<f64>)>;

/// Scatter points against a category index: `(category index, value)`.
pub type CategoryPoints = Vec<(usize, f64)>;
