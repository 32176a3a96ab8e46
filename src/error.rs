use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("required field `{field}` is empty")]
    MissingRequiredField { field: &'static str },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid callback payload: {0}")]
    InvalidPayload(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
