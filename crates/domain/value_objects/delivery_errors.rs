use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidField(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidRange(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("Storage failure")]
    Storage(#[from] anyhow::Error),
}
