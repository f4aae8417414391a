use std::path::PathBuf;

/// Errors surfaced by the data layer. Every user action is wrapped at the
/// event-handler boundary and shown in the error modal; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("column '{0}' is not present in the data")]
    MissingColumn(String),

    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("invalid filter predicate: {0}")]
    InvalidPredicate(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("no data loaded")]
    NoData,

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
