//! Error types for the session-core crate.

use thiserror::Error;

/// All errors that can originate from the pipeline or its configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte stream endpoint could not be opened or created at startup.
    #[error("cannot open byte stream {path}: {source}")]
    ByteStreamOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The command stream endpoint could not be opened or created at startup.
    #[error("cannot open command stream {path}: {source}")]
    CommandStreamOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// A record failed to serialize and was dropped.
    #[error("failed to serialize record {id}: {source}")]
    Serialization {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Underlying I/O failure not covered by a more specific variant.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short, stable code for the startup-fatal diagnostic written to the log
    /// before the process exits. Not exposed over any wire protocol — this
    /// system has none — just a grep-friendly tag in the log line.
    pub fn code(&self) -> &'static str {
        match self {
            Error::ByteStreamOpen { .. } => "BYTE_STREAM_OPEN",
            Error::CommandStreamOpen { .. } => "COMMAND_STREAM_OPEN",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Serialization { .. } => "SERIALIZATION_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
