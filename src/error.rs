//! Unified error type.

use std::net::AddrParseError;

/// The error type returned by glass's fallible operations.
///
/// Almost every variant is a *construction* error: the shape of a resource
/// could not be turned into routes, and [`Router::new`](crate::Router::new)
/// refused to build anything. Request-time problems (404, 405, a path
/// variable that does not parse) are answered with a [`Response`](crate::Response),
/// never surfaced as an `Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter type that cannot be decoded from a request.
    #[error("`{method}`: {arg} has unsupported type `{ty}`")]
    UnsupportedArg {
        method: String,
        arg: String,
        ty: &'static str,
    },

    /// A return type that is neither body-like nor status-like.
    #[error("`{method}`: return type `{ty}` is not supported")]
    UnsupportedReturn { method: String, ty: &'static str },

    #[error("`{method}` returns {count} values, at most one status and one body are allowed")]
    TooManyReturns { method: String, count: usize },

    /// Two return values compete for the same slot (two bodies, two statuses).
    #[error("`{method}` returns more than one {slot} value")]
    DuplicateSlot { method: String, slot: &'static str },

    /// A `Middleware` parameter that would bind a path variable. Middleware
    /// has no pattern of its own, so there is nothing for it to bind to.
    #[error("`{method}`: {arg} of type `{ty}` is a path variable, middleware cannot take one")]
    MiddlewarePathArg {
        method: String,
        arg: String,
        ty: &'static str,
    },

    /// An exported field had no value when its sub-router was built.
    #[error("field `{field}` is unset")]
    NilField { field: String },

    #[error("`{method}` is declared more than once")]
    DuplicateMethod { method: String },

    /// The path-matching engine rejected a pattern, or two routes claim the
    /// same pattern for the same HTTP method.
    #[error("route `{pattern}`: {reason}")]
    Conflict { pattern: String, reason: String },

    #[error("invalid address: {0}")]
    Addr(#[from] AddrParseError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
