//! Shell-specific error types

use thiserror::Error;
use bridge::BridgeError;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {field}: {message}")]
    Config { field: String, message: String },

    #[error("Probe client setup failed: {0}")]
    ProbeClient(String),

    #[error("Could not open {url}: {message}")]
    HelpOpen { url: String, message: String },

    #[error("Window error: {0}")]
    Window(#[from] BridgeError),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ShellError {
    pub fn config(field: impl Into<String>, message: impl ToString) -> Self {
        Self::Config {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
