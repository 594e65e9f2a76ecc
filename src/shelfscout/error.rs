use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Book not found: {0}")]
    BookNotFound(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ShelfError>;
