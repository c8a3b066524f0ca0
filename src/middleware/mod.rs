//! Middleware: the `Middleware` method of a resource.
//!
//! A resource gets at most one interceptor, the method it declares under the
//! exact name `Middleware`. It is bound like any other method (same
//! parameters, same return slots) but never registered as a route. Instead
//! it runs ahead of every route in its mount's subtree:
//!
//! ```text
//! request → root Middleware → … → mount Middleware → route
//!                 │                       │
//!                 └── Location set? stop ─┘
//! ```
//!
//! There is no ordered stack to configure. A mount's chain is its ancestors'
//! interceptors followed by its own, and the only way to stop it is a
//! redirect: once an interceptor leaves a non-empty `Location` header on the
//! response, nothing further runs for that request.

use tracing::{debug, warn};

use crate::handler::{Caller, ErasedHandler, Exchange, Rejection};
use crate::status::Status;

/// Declared name of the interceptor method.
pub(crate) const MIDDLEWARE: &str = "Middleware";

/// A bound `Middleware` method and the mount it belongs to.
#[derive(Clone)]
pub(crate) struct Interceptor {
    mount: String,
    caller: Caller,
}

impl Interceptor {
    pub(crate) fn new(mount: impl Into<String>, caller: Caller) -> Self {
        Self { mount: mount.into(), caller }
    }
}

/// One registered route: its mount's interceptors, then the route itself.
pub(crate) struct Chain {
    interceptors: Vec<Interceptor>,
    route: Caller,
    method: String,
}

impl Chain {
    pub(crate) fn new(interceptors: Vec<Interceptor>, route: Caller, method: impl Into<String>) -> Self {
        Self { interceptors, route, method: method.into() }
    }

    fn run(&self, exchange: &Exchange) -> Result<(), Rejection> {
        for interceptor in &self.interceptors {
            (interceptor.caller)(exchange)?;
            if exchange.writer.redirected() {
                debug!(mount = %interceptor.mount, route = %self.method, "middleware redirected, skipping route");
                return Ok(());
            }
        }
        (self.route)(exchange)
    }
}

impl ErasedHandler for Chain {
    fn call(&self, exchange: &Exchange) {
        if let Err(rejected) = self.run(exchange) {
            warn!(route = %self.method, arg = %rejected.arg, value = %rejected.value, "rejecting path variable");
            exchange.writer.write_status(Status::BadRequest);
        }
    }
}

