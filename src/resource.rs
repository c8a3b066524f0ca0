//! Declaring what a type exposes.
//!
//! Rust cannot enumerate a type's methods at runtime, so a resource lists
//! them once, by name, in [`Resource::expose`]. Everything else (parameter
//! kinds, return slots, URL shape) is read off the method signatures.
//!
//! ```rust
//! use std::sync::Arc;
//! use glass::{Api, Resource, ResponseWriter};
//!
//! struct Shop {
//!     account: Arc<Account>,
//! }
//!
//! impl Shop {
//!     fn home(&self, w: ResponseWriter) {
//!         w.write("welcome");
//!     }
//!
//!     fn product(&self, id: i64) -> (i32, String) {
//!         (200, format!("product {id}"))
//!     }
//! }
//!
//! impl Resource for Shop {
//!     fn expose(api: &mut Api<Self>) {
//!         api.method("Home", Shop::home)              // /Home
//!             .method("Product", Shop::product)       // /Product/{param-1}
//!             .field("Account", |s| &s.account);      // /Account/…
//!     }
//! }
//!
//! struct Account;
//!
//! impl Account {
//!     fn login(&self) -> &'static str { "Success" }
//! }
//!
//! impl Resource for Account {
//!     fn expose(api: &mut Api<Self>) {
//!         api.method("Login", Account::login);        // /Account/Login
//!     }
//! }
//! ```
//!
//! Names follow the exported-identifier convention: a name whose first
//! letter is not upper case is private and skipped, for methods and fields
//! alike.

use std::sync::Arc;

use crate::analyze::RouteSpec;
use crate::config::Decoding;
use crate::error::Error;
use crate::handler::Caller;
use crate::mux::PathRouter;
use crate::router::{self, Mount, Scope};
use crate::signature::{Callable, Signature};

/// A type whose methods become routes.
///
/// The origin is shared as `Arc<Self>` and every method receives `&self`.
/// Concurrent requests may call into the same origin at once; state that
/// methods change must bring its own synchronisation (atomics, a mutex).
pub trait Resource: Send + Sync + Sized + 'static {
    fn expose(api: &mut Api<Self>);
}

type Bind<T> = Box<dyn FnOnce(Arc<T>, &RouteSpec, Decoding) -> Result<Caller, Error>>;
type Compose<T> = Box<dyn FnOnce(&T, Scope, &mut PathRouter) -> Result<Mount, Error>>;

pub(crate) struct Exposed<T> {
    pub(crate) name: &'static str,
    pub(crate) signature: Signature,
    pub(crate) bind: Bind<T>,
}

pub(crate) struct Mounted<T> {
    pub(crate) name: &'static str,
    pub(crate) compose: Compose<T>,
}

/// The method set and sub-resources of one resource, in declaration order.
pub struct Api<T> {
    pub(crate) methods: Vec<Exposed<T>>,
    pub(crate) fields: Vec<Mounted<T>>,
}

impl<T: Resource> Api<T> {
    pub(crate) fn new() -> Self {
        Self { methods: Vec::new(), fields: Vec::new() }
    }

    /// Exposes `method` under `name`.
    ///
    /// Verbs in the name (`GET`, `POST`, …) restrict the HTTP methods and
    /// are dropped from the route; `Index` answers at the resource's own
    /// path; `Middleware` runs before every route instead of being one.
    pub fn method<M, F>(&mut self, name: &'static str, method: F) -> &mut Self
    where
        M: 'static,
        F: Callable<T, M>,
    {
        self.methods.push(Exposed {
            name,
            signature: <F as Callable<T, M>>::signature(),
            bind: Box::new(move |origin: Arc<T>, spec: &RouteSpec, decoding: Decoding| {
                method.bind(origin, spec, decoding)
            }),
        });
        self
    }

    /// Mounts the sub-resource reached through `access` under `/name`.
    ///
    /// The field is read once, when the router is built. A field that holds
    /// no value then fails construction.
    pub fn field<C, V, A>(&mut self, name: &'static str, access: A) -> &mut Self
    where
        C: Resource,
        V: Field<C> + 'static,
        A: Fn(&T) -> &V + 'static,
    {
        self.fields.push(Mounted {
            name,
            compose: Box::new(move |origin: &T, scope: Scope, mux: &mut PathRouter| {
                let Some(value) = access(origin).resolve() else {
                    return Err(Error::NilField {
                        field: scope.prefix().trim_start_matches('/').to_owned(),
                    });
                };
                router::compose(value, scope, mux)
            }),
        });
        self
    }
}

/// A field that may hold a sub-resource.
pub trait Field<C> {
    fn resolve(&self) -> Option<Arc<C>>;
}

impl<C> Field<C> for Arc<C> {
    fn resolve(&self) -> Option<Arc<C>> {
        Some(Arc::clone(self))
    }
}

impl<C> Field<C> for Option<Arc<C>> {
    fn resolve(&self) -> Option<Arc<C>> {
        self.clone()
    }
}
