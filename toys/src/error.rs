use thiserror::Error;

use crate::toy::ToyKind;

/// Caller-visible failures: a usage mistake rather than a data-quality issue.
#[derive(Debug, Error)]
pub enum ToyError {
    #[error("request not found: {name}")]
    RequestNotFound { name: String },

    #[error("no parser registered for file type '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("cannot tell the request kind from method '{method}' and url '{url}'")]
    UnknownKind { method: String, url: String },

    #[error("no transport registered for {kind} requests")]
    NoTransport { kind: ToyKind },

    #[error("transport failed: {0}")]
    Transport(String),
}
