//! Error types for the Rebrandly client.
//!
//! # Design
//! The taxonomy is flat. `NotFound` carries a [`Missing`] describing which
//! entity was absent: the transport layer only knows a 404 happened, so it
//! raises `Missing::Unknown` and the services replace it with the identifier
//! they requested. Callers branch on [`RebrandlyError::status`] or on the
//! variant, never on the message text.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The entity a 404 response refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// Raised by the transport client, which does not know the resource kind.
    Unknown,
    Link(String),
    Tag(String),
    /// A link/tag relation call; the API does not say which side is absent.
    LinkOrTag,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Unknown => write!(f, "Resource not found"),
            Missing::Link(id) => write!(f, "Link with ID '{id}' not found"),
            Missing::Tag(id) => write!(f, "Tag with ID '{id}' not found"),
            Missing::LinkOrTag => write!(f, "Link or Tag not found"),
        }
    }
}

/// Errors returned by `RebrandlyClient` and the resource services.
#[derive(Debug, Error)]
pub enum RebrandlyError {
    /// The server returned 401.
    #[error("Invalid API key provided")]
    InvalidApiKey,

    /// The server returned 404.
    #[error("{0}")]
    NotFound(Missing),

    /// The server returned a 4xx other than 401 and 404.
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        /// The decoded error body, or an empty object if it was not JSON.
        context: Value,
    },

    /// The response could not be decoded or violated the API contract.
    #[error("{0}")]
    InvalidResponse(String),

    /// No usable HTTP response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A caller-supplied value cannot be sent, for example an empty id.
    /// Raised before any request is made.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RebrandlyError {
    /// HTTP status code associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RebrandlyError::InvalidApiKey => Some(401),
            RebrandlyError::NotFound(_) => Some(404),
            RebrandlyError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded remote error body for `Api` errors.
    pub fn context(&self) -> Option<&Value> {
        match self {
            RebrandlyError::Api { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RebrandlyError::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, RebrandlyError>;
