//! Crate-wide error type.
//!
//! The taxonomy is deliberately small. Failures fall into two classes:
//! hard conditions (pool capacity, cross-pool code confusion, malformed
//! names, unusable axes) which are reported as `Error`, and ordinary
//! absence (empty axis, no parent, missing attribute) which is always an
//! `Option` or an empty iterator, never an `Error`. Callers rely on cheap
//! error-free "is there anything on this axis" checks, so the distinction
//! is part of the API contract.

use std::sync::Arc;

/// Structured error codes emitted by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A name pool table (URIs, prefixes, hash chain, prefixes per URI)
    /// hit its hard capacity limit. Non-recoverable.
    PoolLimitExceeded,
    /// A namecode/fingerprint was queried that this pool never issued.
    /// Indicates a caller bug such as mixing codes across pool instances.
    UnknownNameCode,
    /// A string failed QName/NCName lexical validation.
    InvalidName,
    /// An axis name string did not match any known axis.
    UnknownAxis,
    /// The node implementation cannot serve the requested axis. Distinct
    /// from an axis that is legally empty for the node kind.
    UnsupportedAxis,
    /// A receiver reported a failure while consuming copy/namespace events.
    ReceiverError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PoolLimitExceeded => "pool-limit-exceeded",
            ErrorCode::UnknownNameCode => "unknown-name-code",
            ErrorCode::InvalidName => "invalid-name",
            ErrorCode::UnknownAxis => "unknown-axis",
            ErrorCode::UnsupportedAxis => "unsupported-axis",
            ErrorCode::ReceiverError => "receiver-error",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Compose an error with a chained cause.
    pub fn with_source(mut self, source: Arc<dyn std::error::Error + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn pool_limit(table: &str, limit: usize) -> Self {
        Self::new(
            ErrorCode::PoolLimitExceeded,
            format!("name pool limit exceeded: more than {limit} {table}"),
        )
    }

    pub fn unknown_name_code(raw: u32) -> Self {
        Self::new(
            ErrorCode::UnknownNameCode,
            format!("name code {raw:#x} was not allocated in this pool"),
        )
    }

    pub fn invalid_name(text: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::InvalidName,
            format!("invalid name {text:?}: {reason}"),
        )
    }

    pub fn unknown_axis(name: &str) -> Self {
        Self::new(ErrorCode::UnknownAxis, format!("unknown axis name {name:?}"))
    }

    pub fn unsupported_axis(axis: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedAxis,
            format!("the {axis} axis is not supported by this node implementation"),
        )
    }

    pub fn receiver(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ReceiverError, message)
    }
}
