// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdError {
    #[error("Entry ID {0} already exists")]
    DuplicateKey(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("Malformed backup document: {0}")]
    MalformedDocument(String),

    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Editor exited with a non-zero status")]
    EditorError,
}

pub type Result<T> = std::result::Result<T, PdError>;
