use polars::error::PolarsError;
use thiserror::Error;

/// Everything that can abort an analysis run.
///
/// Missing *optional* fields inside a well-formed row (`---`, `----`, an
/// absent syn flag) never show up here; they become nulls in the output
/// table. A missing header or section marker, by contrast, means the file
/// is not what the external tool was supposed to produce and the whole run
/// stops.
#[derive(Error, Debug)]
pub enum DnaParamError {
    #[error("format mismatch in {file}: expected {expected}")]
    FormatMismatch { file: String, expected: String },

    #[error("{tool} failed ({status}): {stderr}")]
    ExternalToolFailure {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("strand imbalance: {0}")]
    StrandImbalance(String),

    #[error("unrecognized base '{0}' in replacement sequence")]
    UnknownBase(char),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, DnaParamError>;

impl DnaParamError {
    /// Shorthand used all over the report parsers.
    pub fn format(file: impl Into<String>, expected: impl Into<String>) -> Self {
        DnaParamError::FormatMismatch {
            file: file.into(),
            expected: expected.into(),
        }
    }
}
