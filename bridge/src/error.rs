//! Bridge-specific error types

use std::path::PathBuf;
use thiserror::Error;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Host server startup failed on {addr}: {source}")]
    ServerStartupFailed {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Static bundle not found: {path}")]
    BundleNotFound { path: PathBuf },

    #[error("Invalid development server address: {0}")]
    InvalidDevServer(#[from] url::ParseError),

    #[error("Malformed data URL payload")]
    MalformedDataUrl,

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("File write failed for {path}: {message}")]
    FileWrite { path: PathBuf, message: String },

    #[error("Save dialog failed: {0}")]
    Dialog(String),

    #[error("Window already closed")]
    WindowClosed,

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BridgeError {
    pub fn file_write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::FileWrite {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
