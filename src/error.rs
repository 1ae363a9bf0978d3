use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a mining run before or after clustering.
///
/// Per-line parse failures are not represented here: they are reported as
/// [`crate::record_parser::SkipReason`] values and never stop a run.
#[derive(Error, Debug)]
pub enum MinerError {
    #[error("Invalid log format {template:?}: {reason}")]
    InvalidFormat { template: String, reason: String },

    #[error("Log format {template:?} compiled to an invalid pattern: {source}")]
    InvalidPattern {
        template: String,
        #[source]
        source: regex::Error,
    },

    #[error("Similarity threshold must be a number, got {0}")]
    InvalidThreshold(f64),

    #[error("Failed to read input file {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl MinerError {
    pub(crate) fn invalid_format(template: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MinerError>;
