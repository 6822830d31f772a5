use crate::domain::ColumnKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwimlaneError>;

#[derive(Debug, Error)]
pub enum SwimlaneError {
    #[error("Column not mounted: {0}")]
    ColumnNotMounted(ColumnKey),

    #[error("Unknown column key: {0}")]
    UnknownColumn(String),

    #[error("Invalid card ID: {0}")]
    InvalidCardId(String),

    #[error("Surface error: {0}")]
    SurfaceError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
