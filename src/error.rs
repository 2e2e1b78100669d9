//! Error types for the service panel.

use thiserror::Error;

/// Startup failures. Any of these terminates the process.
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {message}")]
    Server { message: String },
}

/// Failures of the external service manager.
///
/// These are logged with full detail; clients only ever see a fixed message.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Unreadable service manager output: {message}")]
    Decode { message: String },
}
