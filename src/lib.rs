//! # glass
//!
//! Turn an object's methods into HTTP routes. Declare the methods once;
//! names, parameters and return types decide the rest.
//!
//! ## The convention
//!
//! - **Method name → path segment.** `Login` is `/Login`. `Index` is the
//!   resource's own path.
//! - **Verbs in the name → method filter.** `ItemPOST` is `/Item`, `POST`
//!   only. Names without a verb answer to every method.
//! - **Parameters → path variables.** `String` and signed integers become
//!   `/{param-1}/{param-2}/…` in declaration order. [`Request`] and
//!   [`ResponseWriter`] parameters are injected instead and never show up in
//!   the URL.
//! - **Return values → response.** An integer or [`Status`] is the status
//!   code, a string is the body; status is always written first.
//! - **Fields → sub-routers.** A field declared as `User` mounts its
//!   resource under `/User`.
//! - **`Middleware` → interceptor.** It runs before every route of its
//!   resource and of everything mounted below it; setting a `Location`
//!   header stops the request there.
//!
//! Everything is checked once, when the router is built. A shape that cannot
//! be routed (an `f64` parameter, three return values, an unset field) is an
//! [`Error`] from [`Router::new`], never a surprise at request time.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//!
//! use glass::{Api, Request, Resource, ResponseWriter, Router, Server, Status};
//!
//! #[derive(Default)]
//! struct Counter {
//!     total: AtomicI64,
//! }
//!
//! impl Counter {
//!     // GET|POST|… /Add/{param-1}
//!     fn add(&self, n: i64) -> String {
//!         let total = self.total.fetch_add(n, Ordering::SeqCst) + n;
//!         total.to_string()
//!     }
//!
//!     // DELETE /Reset
//!     fn reset(&self) -> Status {
//!         self.total.store(0, Ordering::SeqCst);
//!         Status::NoContent
//!     }
//!
//!     // runs before every route
//!     fn middleware(&self, w: ResponseWriter, r: Request) {
//!         if r.path() == "/" {
//!             w.redirect(&r, "Add/0", Status::Found);
//!         }
//!     }
//! }
//!
//! impl Resource for Counter {
//!     fn expose(api: &mut Api<Self>) {
//!         api.method("Add", Counter::add)
//!             .method("ResetDELETE", Counter::reset)
//!             .method("Middleware", Counter::middleware);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), glass::Error> {
//!     let app = Router::new(Arc::new(Counter::default()))?;
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```
//!
//! ## Shared state
//!
//! The origin is an `Arc<T>` owned by the caller, and methods take `&self`.
//! glass adds no locking: if concurrent requests change the same state, the
//! resource synchronises it itself.

mod analyze;
mod build;
mod config;
mod error;
mod handler;
mod method;
mod middleware;
mod mux;
mod request;
mod resource;
mod response;
mod router;
mod server;
mod signature;
mod status;

pub use analyze::{Arg, OutputSlot, RouteSpec, Slot};
pub use config::{Config, Decoding};
pub use error::Error;
pub use method::{Method, MethodFilter};
pub use request::Request;
pub use resource::{Api, Field, Resource};
pub use response::{ContentType, Response, ResponseBuilder, ResponseWriter};
pub use router::{Mount, Route, Router};
pub use server::Server;
pub use signature::{ArgKind, Callable, Output, OutputKind, Outputs, Param, Signature, Width};
pub use status::Status;
