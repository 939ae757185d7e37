// src/error.rs

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::data_input::capture_data::Channel;

/// Result type for capture analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised while loading or analysing a single capture or RF file.
/// Batch runners skip files on file-scoped errors and abort on setup errors.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// File could not be opened or read
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No usable data rows after the metadata block
    #[error("No valid data rows in '{0}'")]
    EmptyCapture(PathBuf),

    /// A calculation asked for a channel the layout does not map
    #[error("Channel '{0}' is not mapped to a column")]
    ChannelNotMapped(Channel),

    /// Neither a time column nor a sample rate was configured
    #[error("No time base: map a time column or set capture.sample_rate_hz")]
    MissingTimeBase,

    /// Clock period needs at least two rising edges
    #[error("Clock period needs at least 2 rising edges, found {found}")]
    InsufficientClockEdges { found: usize },

    /// Median clock period came out zero, negative or NaN
    #[error("Degenerate clock period estimate: {0}")]
    DegenerateClockPeriod(f64),

    /// Malformed Touchstone network data
    #[error("Touchstone parse error in '{path}' line {line}: {reason}")]
    Touchstone {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Configuration file is not valid TOML for the expected schema
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but holds contradictory values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure concerns the input file itself rather than the setup,
    /// i.e. the remaining files of a batch are still worth trying.
    pub fn is_file_scoped(&self) -> bool {
        !matches!(
            self,
            AnalysisError::ChannelNotMapped(_)
                | AnalysisError::MissingTimeBase
                | AnalysisError::ConfigParse(_)
                | AnalysisError::InvalidConfig(_)
        )
    }
}
