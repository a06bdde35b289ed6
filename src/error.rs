//! Unified error type.

use std::net::AddrParseError;

use thiserror::Error;

/// The error type returned by sprig's fallible operations.
///
/// Application-level outcomes (an unmatched route, a middleware calling
/// [`Context::fail`](crate::Context::fail), a recovered panic) are expressed
/// as HTTP responses, not as `Error`s. This type surfaces registration
/// mistakes and infrastructure failures: binding to a port or accepting a
/// connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    /// A route pattern that cannot be inserted into the tree.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    #[error("unknown http method `{0}`")]
    UnknownMethod(String),
}
