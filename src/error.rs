use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Card has expired")]
    Expired,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Credit limit would be exceeded")]
    CreditLimitExceeded,
    #[error("Card not found: {0}")]
    NotFound(Uuid),
    #[error("Card number {0} is already issued")]
    DuplicateCardNumber(String),
    #[error("Unknown card reference: {0}")]
    UnknownReference(u32),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, CardError>;
