//! Error types for the connector.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Status` with the raw status
//! code and body. Transport errors are passed through untranslated.

use thiserror::Error;

/// Error type client modifiers may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `Connector` calls.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (DNS, refused connection) or
    /// the body could not be read.
    #[error("transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body matched neither the JSON shape nor a primitive form of the
    /// response type.
    #[error("deserialization failed: {source}")]
    Deserialization {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// A header name or value cannot be sent on the wire. Raised before any
    /// connection is made.
    #[error("invalid header `{name}`")]
    InvalidHeader { name: String },

    /// The request content could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The relative path could not be resolved against the base address.
    #[error("cannot resolve `{path}` against the base address: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

impl ConnectorError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ConnectorError::NotFound => Some(404),
            ConnectorError::Status { status, .. } => Some(*status),
            ConnectorError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ConnectorError::Transport(_))
    }
}
