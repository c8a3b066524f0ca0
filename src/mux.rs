//! Radix-tree path matching.
//!
//! One `matchit` tree for every pattern, each leaf holding the endpoints
//! registered under that pattern with their method filters. Matching is by
//! specificity (static segments beat path variables), never by insertion
//! order. The router never matches patterns itself; it only generates them
//! and registers here.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::{Method, MethodFilter};

struct Endpoint {
    methods: MethodFilter,
    handler: BoxedHandler,
}

/// Result of matching a request against the registered patterns.
pub(crate) enum Lookup {
    Found {
        handler: BoxedHandler,
        params: HashMap<String, String>,
    },
    /// The path matched, but no endpoint accepts the method. Carries the
    /// methods that would have been accepted.
    MethodNotAllowed(MethodFilter),
    /// The path matched, but a path variable is not valid UTF-8 once
    /// percent-decoded. Carries the variable's name.
    Malformed(String),
    NotFound,
}

#[derive(Default)]
pub(crate) struct PathRouter {
    tree: MatchitRouter<usize>,
    slots: Vec<Vec<Endpoint>>,
    index: HashMap<String, usize>,
}

impl PathRouter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `pattern` and `methods`.
    ///
    /// A pattern may be registered several times with disjoint method
    /// filters. Overlapping filters on the same pattern, or patterns the tree
    /// cannot tell apart, are a [`Error::Conflict`].
    pub(crate) fn register(
        &mut self,
        pattern: &str,
        methods: MethodFilter,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        let slot = match self.index.get(pattern) {
            Some(&slot) => slot,
            None => {
                let slot = self.slots.len();
                self.tree.insert(pattern, slot).map_err(|e| Error::Conflict {
                    pattern: pattern.to_owned(),
                    reason: e.to_string(),
                })?;
                self.index.insert(pattern.to_owned(), slot);
                self.slots.push(Vec::new());
                slot
            }
        };

        let endpoints = &mut self.slots[slot];
        if let Some(taken) = endpoints.iter().find(|e| e.methods.overlaps(&methods)) {
            return Err(Error::Conflict {
                pattern: pattern.to_owned(),
                reason: format!("methods {methods} overlap an existing route for {}", taken.methods),
            });
        }
        endpoints.push(Endpoint { methods, handler });
        Ok(())
    }

    /// Matches `path` (still percent-encoded) and `method`. Path variables
    /// come back percent-decoded.
    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        let Ok(matched) = self.tree.at(path) else {
            return Lookup::NotFound;
        };
        let endpoints = &self.slots[*matched.value];

        let Some(endpoint) = endpoints.iter().find(|e| e.methods.allows(method)) else {
            return Lookup::MethodNotAllowed(
                endpoints.iter().flat_map(|e| e.methods.methods().iter().copied()).collect(),
            );
        };

        let mut params = HashMap::with_capacity(matched.params.len());
        for (key, raw) in matched.params.iter() {
            let Ok(value) = percent_decode_str(raw).decode_utf8() else {
                return Lookup::Malformed(key.to_owned());
            };
            params.insert(key.to_owned(), value.into_owned());
        }
        Lookup::Found { handler: Arc::clone(&endpoint.handler), params }
    }
}
