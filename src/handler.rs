//! Call sites and type erasure.
//!
//! Every route ends up as a [`Caller`]: a closure that decodes its arguments
//! from the current [`Exchange`], calls the bound method on its origin and
//! encodes the returned values into the response. Callers of different
//! resources, arities and return types all share this one shape, so the
//! path router can store them side by side.
//!
//! ```text
//! fn sum(&self, a: i32, b: i32)                  ← user writes this
//!        ↓ api.method("Sum", Calc::sum)
//! Callable::bind(origin, &spec, decoding)        ← decoders + encoder built once
//!        ↓
//! Arc<dyn Fn(&Exchange) -> Result<(), Rejection>>
//!        ↓ wrapped with the mount's interceptors
//! Chain::call(&exchange)  at request time        ← no type inspection left
//! ```

use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseWriter;

/// The request being served and the response being written for it.
#[doc(hidden)]
pub struct Exchange {
    pub(crate) request: Request,
    pub(crate) writer: ResponseWriter,
}

impl Exchange {
    pub(crate) fn new(request: Request) -> Self {
        Self { request, writer: ResponseWriter::new() }
    }
}

/// A path variable refused by strict decoding.
#[doc(hidden)]
#[derive(Debug)]
pub struct Rejection {
    pub(crate) arg: String,
    pub(crate) value: String,
}

/// A bound method, ready to run against an exchange.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Callable` trait's `bind` method.
#[doc(hidden)]
pub type Caller = Arc<dyn Fn(&Exchange) -> Result<(), Rejection> + Send + Sync + 'static>;

/// Internal dispatch interface of whatever the path router matched.
pub(crate) trait ErasedHandler {
    fn call(&self, exchange: &Exchange);
}

/// A type-erased handler shared across concurrent requests.
pub(crate) type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;
