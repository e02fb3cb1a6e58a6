//! Error type shared by the selection core and the classification workflow.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A colour sequence whose length is neither 1 nor the point count.
    #[error("invalid input: {colors} colours supplied for {points} points (expected 1 or {points})")]
    InvalidInput { points: usize, colors: usize },

    /// The bound point set carries no base colour to build an overlay from.
    #[error("point collection has no facecolour; a selection session needs at least one base colour")]
    MissingColorState,

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    /// Unreadable delimited input (bad quoting, invalid UTF-8).
    #[error("dataset read error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed row in the long-format dataset (1-based line number).
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("dataset is missing column '{0}'")]
    MissingColumn(String),

    #[error("dataset has no channel named '{0}'")]
    MissingChannel(String),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("report serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UI error: {0}")]
    Ui(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<eframe::Error> for Error {
    fn from(e: eframe::Error) -> Self {
        Error::Ui(e.to_string())
    }
}
