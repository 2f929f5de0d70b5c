use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("row {row}: conflicting values for '{canonical}' and legacy field '{legacy}'")]
    ConflictingFields {
        row: usize,
        canonical: String,
        legacy: String,
    },

    #[error("row {row}: field '{field}' is not a valid non-negative number: '{value}'")]
    InvalidNumber {
        row: usize,
        field: String,
        value: String,
    },

    #[error("row {row}: timestamp '{value}' does not match %d/%m/%Y %H:%M:%S")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: no reference table entry for region '{region}'")]
    UnknownRegion { row: usize, region: String },
}

pub type Result<T> = std::result::Result<T, SurveyError>;
