use thiserror::Error;

/// A fault raised by a [`Transport`](crate::Transport) before a response
/// could be read.
///
/// These never reach callers of [`GuardedClient`](crate::GuardedClient);
/// each variant is folded into an attempt context and normalized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// The request was aborted because its deadline fired.
    #[error("request cancelled by deadline")]
    Cancelled,

    /// The connection failed before any response arrived.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// Any other fault, such as a failure while reading the body.
    #[error("transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Cancelled
        } else if err.is_connect() || err.is_request() {
            Self::Unreachable(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Errors raised while loading [`ConsoleConfig`](crate::ConsoleConfig).
///
/// Configuration is resolved once at process start; request logic never
/// sees these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required setting is missing.
    #[error("missing required configuration: {key}")]
    MissingRequired {
        /// Environment variable name
        key: String,
    },

    /// A setting is present but unusable.
    #[error("invalid configuration for {key}: {reason}")]
    InvalidValue {
        /// Environment variable name
        key: String,
        /// Why the value was rejected
        reason: String,
    },
}
