use thiserror::Error;

#[derive(Error, Debug)]
pub enum Dat2CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot read source {path}: {source}")]
    UnreadableSource {
        path: String,
        source: std::io::Error,
    },

    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    #[error("delimiter must be a single character, got {0:?}")]
    InvalidDelimiter(String),

    #[error("count-based strategy requires an expected column count")]
    MissingExpectedColumns,

    #[error("expected column count must be positive")]
    InvalidExpectedColumns,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Dat2CsvError>;
