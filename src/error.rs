use thiserror::Error;

pub type FormportResult<T> = Result<T, FormportError>;

#[derive(Error, Debug)]
pub enum FormportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Config error: {0}")]
    Config(String),

    /// Token does not match `[$]?[A-Z]+[$]?[0-9]*` (or has an impossible row/column)
    #[error("Invalid reference '{0}'")]
    InvalidReference(String),

    /// Token addresses a column that is not part of the current sheet's mapping
    #[error("Unknown column '{column}' in reference '{reference}'")]
    UnknownColumn { column: String, reference: String },

    /// Range spanning more than one column
    #[error("Multi-column range '{0}' cannot be expressed as a column reference; kept unchanged")]
    UnsupportedRange(String),

    /// Anything unexpected while converting a formula. The only error that fails a conversion.
    #[error("Conversion failed: {0}")]
    InternalConversionFailure(String),
}
