use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Sort error: {0}")]
    Sort(String),

    #[error("Error occurred while setting parameter {parameter} with value {value}")]
    WriteRejected { parameter: String, value: String },

    #[error("Unable to find corresponding value for {0}")]
    Translation(String),

    #[error("File is in use by another process: {0}")]
    FileLocked(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Unknown standard: {0}")]
    UnknownStandard(String),

    #[error("Model error: {0}")]
    Host(String),
}

impl BridgeError {
    /// Shorthand for a rejected parameter write.
    pub fn write_rejected(parameter: impl Into<String>, value: impl ToString) -> Self {
        BridgeError::WriteRejected {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }
}
