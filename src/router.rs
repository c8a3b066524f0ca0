//! Router composition and dispatch.
//!
//! [`Router::new`] walks a resource once, at startup:
//!
//! 1. **Introspect**: call [`Resource::expose`] to get the declared methods
//!    and fields.
//! 2. **Classify methods**: skip private names, reject duplicates, pull out
//!    `Middleware` (which may not take path variables), keep the rest as routes.
//! 3. **Register**: analyse and bind each route, mount it under the
//!    resource's prefix behind the interceptors in scope, and hand it to the
//!    path router.
//! 4. **Classify fields**: skip private names, fail on unset ones, compose
//!    the rest as child mounts under `/FieldName`.
//!
//! Any shape problem aborts the whole construction with an [`Error`]. After
//! that the route set never changes and dispatch is lookups and calls only.

use std::any::type_name;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, debug_span, info};

use crate::analyze::{Arg, RouteSpec, analyze};
use crate::build;
use crate::config::Config;
use crate::error::Error;
use crate::handler::{BoxedHandler, ErasedHandler, Exchange};
use crate::method::{Method, MethodFilter};
use crate::middleware::{Chain, Interceptor, MIDDLEWARE};
use crate::mux::{Lookup, PathRouter};
use crate::request::Request;
use crate::resource::{Api, Resource};
use crate::response::Response;
use crate::status::Status;

/// One exposed method, as registered.
#[derive(Debug)]
pub struct Route {
    spec: RouteSpec,
    pattern: String,
}

impl Route {
    /// The full URL pattern, mount prefix included.
    pub fn pattern(&self) -> &str { &self.pattern }
    /// The name the method was declared under.
    pub fn method(&self) -> &str { self.spec.method() }
    pub fn methods(&self) -> &MethodFilter { self.spec.methods() }
    pub fn args(&self) -> &[Arg] { self.spec.args() }
    pub fn spec(&self) -> &RouteSpec { &self.spec }
}

/// One resource in the router tree: its routes, whether it installed a
/// middleware, and one child per exported field.
#[derive(Debug)]
pub struct Mount {
    path: String,
    routes: Vec<Route>,
    middleware: bool,
    children: Vec<(&'static str, Mount)>,
}

impl Mount {
    /// The mount's prefix, `/` for the root.
    pub fn path(&self) -> &str { &self.path }
    /// Routes in declaration order.
    pub fn routes(&self) -> &[Route] { &self.routes }
    pub fn has_middleware(&self) -> bool { self.middleware }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Mount)> {
        self.children.iter().map(|(name, mount)| (*name, mount))
    }

    /// The child mounted for field `name`.
    pub fn mount(&self, name: &str) -> Option<&Mount> {
        self.children.iter().find(|(n, _)| *n == name).map(|(_, mount)| mount)
    }

    fn route_count(&self) -> usize {
        self.routes.len() + self.children.iter().map(|(_, m)| m.route_count()).sum::<usize>()
    }
}

/// Where a resource is being composed: its prefix, the interceptors of its
/// ancestors, and the router-wide configuration.
pub(crate) struct Scope {
    prefix: String,
    interceptors: Vec<Interceptor>,
    config: Config,
}

impl Scope {
    pub(crate) fn prefix(&self) -> &str { &self.prefix }
}

/// The application router, built from one root resource.
///
/// ```rust
/// use std::sync::Arc;
/// use glass::{Api, Method, Request, Resource, Router};
///
/// struct Calc;
///
/// impl Calc {
///     fn sum(&self, a: i32, b: i32) -> String { (a + b).to_string() }
/// }
///
/// impl Resource for Calc {
///     fn expose(api: &mut Api<Self>) {
///         api.method("Sum", Calc::sum);
///     }
/// }
///
/// let router = Router::new(Arc::new(Calc)).unwrap();
/// assert_eq!(router.routes()[0].pattern(), "/Sum/{param-1}/{param-2}");
///
/// let res = router.dispatch(Request::new(Method::Get, "/Sum/2/3"));
/// assert_eq!(res.body_text(), "5");
/// ```
pub struct Router {
    mux: PathRouter,
    root: Mount,
}

impl Router {
    /// Builds the routes of `origin` with the default [`Config`].
    pub fn new<T: Resource>(origin: Arc<T>) -> Result<Self, Error> {
        Self::with_config(origin, Config::default())
    }

    pub fn with_config<T: Resource>(origin: Arc<T>, config: Config) -> Result<Self, Error> {
        let mut mux = PathRouter::new();
        let scope = Scope { prefix: String::new(), interceptors: Vec::new(), config };
        let root = compose(origin, scope, &mut mux)?;
        info!(resource = type_name::<T>(), routes = root.route_count(), "router ready");
        Ok(Self { mux, root })
    }

    /// The root mount.
    pub fn root(&self) -> &Mount { &self.root }

    /// Routes of the root resource, in declaration order.
    pub fn routes(&self) -> &[Route] { self.root.routes() }

    /// The child mounted for the root's field `name`.
    pub fn mount(&self, name: &str) -> Option<&Mount> { self.root.mount(name) }

    /// Routes one request and produces its response.
    ///
    /// `404` when no pattern matches, `405` with an `Allow` header when one
    /// matches but not for this method, `400` when a path variable does not
    /// decode to UTF-8.
    pub fn dispatch(&self, req: Request) -> Response {
        match self.resolve(req.method(), req.path()) {
            Ok(matched) => self.call(matched, req),
            Err(res) => res,
        }
    }

    /// Matches a request line without running anything, so callers can
    /// answer unrouted requests before reading their body.
    pub(crate) fn resolve(&self, method: Method, path: &str) -> Result<Matched, Response> {
        match self.mux.lookup(method, path) {
            Lookup::Found { handler, params } => Ok(Matched { handler, params }),
            Lookup::MethodNotAllowed(allow) => Err(Response::builder()
                .status(Status::MethodNotAllowed)
                .header("allow", &allow.to_string())
                .no_body()),
            Lookup::Malformed(arg) => {
                debug!(%arg, path, "path variable is not valid UTF-8");
                Err(Response::status(Status::BadRequest))
            }
            Lookup::NotFound => Err(Response::status(Status::NotFound)),
        }
    }

    /// Runs a route matched by [`Router::resolve`] for `req`.
    pub(crate) fn call(&self, matched: Matched, mut req: Request) -> Response {
        req.set_params(matched.params);
        let exchange = Exchange::new(req);
        matched.handler.call(&exchange);
        exchange.writer.finish()
    }
}

/// A route found for a request line, with its decoded path variables.
pub(crate) struct Matched {
    handler: BoxedHandler,
    params: HashMap<String, String>,
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Composes `origin` under `scope`, registering every route with `mux`.
pub(crate) fn compose<T: Resource>(
    origin: Arc<T>,
    scope: Scope,
    mux: &mut PathRouter,
) -> Result<Mount, Error> {
    let path = if scope.prefix.is_empty() { "/".to_owned() } else { scope.prefix.clone() };
    let _span = debug_span!("compose", mount = %path, resource = type_name::<T>()).entered();

    let mut api = Api::new();
    T::expose(&mut api);
    let Api { methods, fields } = api;

    let mut seen = HashSet::new();
    if let Some(twice) = methods.iter().find(|m| !seen.insert(m.name)) {
        return Err(Error::DuplicateMethod { method: twice.name.to_owned() });
    }

    let (middleware, ordinary): (Vec<_>, Vec<_>) = methods.into_iter()
        .filter(|m| {
            let exported = is_exported(m.name);
            if !exported {
                debug!(method = m.name, "skipping private method");
            }
            exported
        })
        .partition(|m| m.name == MIDDLEWARE);

    let decoding = scope.config.decoding;
    let mut interceptors = scope.interceptors;
    let mut has_middleware = false;
    if let Some(exposed) = middleware.into_iter().next() {
        let spec = analyze(exposed.name, &exposed.signature)?;
        if let Some(arg) = spec.args().iter().find(|arg| arg.in_url()) {
            return Err(Error::MiddlewarePathArg {
                method: exposed.name.to_owned(),
                arg: arg.name().to_owned(),
                ty: arg.kind().type_name(),
            });
        }
        let caller = (exposed.bind)(Arc::clone(&origin), &spec, decoding)?;
        interceptors.push(Interceptor::new(path.clone(), caller));
        has_middleware = true;
        debug!("middleware installed");
    }

    let mut routes = Vec::with_capacity(ordinary.len());
    for exposed in ordinary {
        let spec = analyze(exposed.name, &exposed.signature)?;
        let caller = (exposed.bind)(Arc::clone(&origin), &spec, decoding)?;
        let pattern = build::join(&scope.prefix, &build::pattern(&spec));

        let chain = Chain::new(interceptors.clone(), caller, exposed.name);
        mux.register(&pattern, spec.methods().clone(), Arc::new(chain))?;
        debug!(%pattern, methods = %spec.methods(), method = exposed.name, "route registered");

        routes.push(Route { spec, pattern });
    }

    let mut children = Vec::new();
    for field in fields {
        if !is_exported(field.name) {
            debug!(field = field.name, "skipping private field");
            continue;
        }
        let child = Scope {
            prefix: format!("{}/{}", scope.prefix, field.name),
            interceptors: interceptors.clone(),
            config: scope.config,
        };
        let mount = (field.compose)(&origin, child, mux)?;
        children.push((field.name, mount));
    }

    Ok(Mount { path, routes, middleware: has_middleware, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf;

    impl Leaf {
        fn test(&self) {}
    }

    impl Resource for Leaf {
        fn expose(api: &mut Api<Self>) {
            api.method("Test", Leaf::test);
        }
    }

    struct Tree {
        leaf: Arc<Leaf>,
    }

    impl Tree {
        fn index(&self) -> &'static str { "root" }
    }

    impl Resource for Tree {
        fn expose(api: &mut Api<Self>) {
            api.method("IndexGET", Tree::index)
                .field("Leaf", |t| &t.leaf)
                .field("hidden", |t| &t.leaf);
        }
    }

    #[test]
    fn exported_names() {
        assert!(is_exported("Login"));
        assert!(is_exported("Ärger"));
        assert!(!is_exported("private"));
        assert!(!is_exported(""));
    }

    #[test]
    fn builds_the_mount_tree() {
        let router = Router::new(Arc::new(Tree { leaf: Arc::new(Leaf) })).unwrap();

        assert_eq!(router.root().path(), "/");
        assert_eq!(router.routes()[0].pattern(), "/");
        assert_eq!(router.routes()[0].methods().methods(), &[Method::Get]);

        let names: Vec<_> = router.root().children().map(|(name, _)| name).collect();
        assert_eq!(names, ["Leaf"]);

        let leaf = router.mount("Leaf").unwrap();
        assert_eq!(leaf.path(), "/Leaf");
        assert_eq!(leaf.routes()[0].pattern(), "/Leaf/Test");
        assert!(!leaf.has_middleware());
        assert_eq!(router.root().route_count(), 2);
    }

    #[test]
    fn dispatch_answers_404_and_405() {
        let router = Router::new(Arc::new(Tree { leaf: Arc::new(Leaf) })).unwrap();

        let res = router.dispatch(Request::new(Method::Post, "/"));
        assert_eq!(res.status_code(), 405);
        assert_eq!(res.header("allow"), Some("GET"));

        let res = router.dispatch(Request::new(Method::Get, "/hidden/Test"));
        assert_eq!(res.status_code(), 404);

        let res = router.dispatch(Request::new(Method::Get, "/"));
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body_text(), "root");
    }
}
