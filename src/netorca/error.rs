//! NetOrca error taxonomy
//!
//! Every failure surfaced by the client, the query builders and the resource
//! handlers is a [`NetOrcaError`]. None of them are retried locally; callers
//! report them upward as-is.

use std::fmt;
use thiserror::Error;

/// Expected type of a filter argument, used in validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int64,
    /// 64-bit integer that must also be >= 0
    UnsignedInt64,
    /// A point of view name
    Pov,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "a string"),
            FieldKind::Int64 => write!(f, "an int64"),
            FieldKind::UnsignedInt64 => write!(f, "a uint64"),
            FieldKind::Pov => write!(f, "one of consumer|serviceowner"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NetOrcaError {
    #[error("{field} not passed as {expected}")]
    Validation {
        field: String,
        expected: FieldKind,
    },

    #[error("http code: {status}\nresponse: {body}\nurl: {url}\nmethod: {method}")]
    Request {
        status: u16,
        body: String,
        url: String,
        method: String,
    },

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid import id {input:?}: {reason}")]
    Format { input: String, reason: String },

    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{summary} ({field}): {detail}")]
    Config {
        field: &'static str,
        summary: String,
        detail: String,
    },

    #[error("unrecognized filter: {0}")]
    UnknownFilter(String),

    #[error("unknown resource or data source type: {0}")]
    UnknownType(String),
}

impl NetOrcaError {
    pub(crate) fn validation(field: &str, expected: FieldKind) -> Self {
        Self::Validation {
            field: field.to_string(),
            expected,
        }
    }

    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn encode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Encode {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn format(input: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP status of a failed request, if this is a request error
    pub fn status(&self) -> Option<u16> {
        match self {
            NetOrcaError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = NetOrcaError> = std::result::Result<T, E>;
