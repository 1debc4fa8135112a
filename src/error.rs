use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("unexpected level {level:?} in column {column}; expected one of {expected:?}")]
    UnexpectedLevel {
        column: String,
        level: String,
        expected: Vec<String>,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
