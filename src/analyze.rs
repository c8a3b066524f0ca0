//! Signature analysis: from a declared method to a [`RouteSpec`].
//!
//! Pure and stateless. Everything the builder and the composer need to know
//! about a route is decided here, once, and carried as data:
//!
//! - the route name and method filter, from the declared name;
//! - one [`Arg`] per parameter, with its kind and URL visibility;
//! - one [`OutputSlot`] per returned value, with its position.
//!
//! Return shapes are checked here. Parameter types are not: an unsupported
//! parameter only fails when the builder tries to decode it.

use crate::error::Error;
use crate::method::{self, MethodFilter};
use crate::signature::{ArgKind, OutputKind, Signature};

/// Route name of a method that answers at its mount's own path.
pub(crate) const INDEX: &str = "Index";

/// Routing metadata of one parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Arg {
    name: String,
    kind: ArgKind,
    position: usize,
}

impl Arg {
    /// `param-<i>`, 1-based over every declared parameter.
    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> ArgKind { self.kind }
    /// 0-based position in the declared parameter list.
    pub fn position(&self) -> usize { self.position }
    pub fn in_url(&self) -> bool { self.kind.in_url() }
}

/// The response slot a returned value writes to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    Status,
    Body,
}

/// One returned value: which slot it feeds, and where it sits in the return
/// tuple.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutputSlot {
    pub slot: Slot,
    pub position: usize,
}

/// The analysed shape of one exposed method.
#[derive(Clone, Debug)]
pub struct RouteSpec {
    method: String,
    name: String,
    methods: MethodFilter,
    args: Vec<Arg>,
    outputs: Vec<OutputSlot>,
}

impl RouteSpec {
    /// The name the method was declared under.
    pub fn method(&self) -> &str { &self.method }
    /// The route name: the declared name without verbs, empty for `Index`.
    pub fn name(&self) -> &str { &self.name }
    pub fn methods(&self) -> &MethodFilter { &self.methods }
    pub fn args(&self) -> &[Arg] { &self.args }
    pub fn outputs(&self) -> &[OutputSlot] { &self.outputs }
}

/// Analyses the method declared as `declared` with signature `sig`.
pub(crate) fn analyze(declared: &str, sig: &Signature) -> Result<RouteSpec, Error> {
    let (mut name, methods) = method::strip_verbs(declared);
    if name == INDEX {
        name.clear();
    }

    let args = sig.params.iter()
        .enumerate()
        .map(|(position, &kind)| Arg {
            name: format!("param-{}", position + 1),
            kind,
            position,
        })
        .collect();

    if sig.outputs.len() > 2 {
        return Err(Error::TooManyReturns {
            method: declared.to_owned(),
            count: sig.outputs.len(),
        });
    }

    let mut outputs: Vec<OutputSlot> = Vec::with_capacity(sig.outputs.len());
    for (position, kind) in sig.outputs.iter().enumerate() {
        let slot = match *kind {
            OutputKind::Body => Slot::Body,
            OutputKind::Status => Slot::Status,
            OutputKind::Unsupported(ty) => {
                return Err(Error::UnsupportedReturn { method: declared.to_owned(), ty });
            }
        };
        if outputs.iter().any(|o| o.slot == slot) {
            return Err(Error::DuplicateSlot {
                method: declared.to_owned(),
                slot: match slot {
                    Slot::Status => "status",
                    Slot::Body => "body",
                },
            });
        }
        outputs.push(OutputSlot { slot, position });
    }

    Ok(RouteSpec {
        method: declared.to_owned(),
        name,
        methods,
        args,
        outputs,
    })
}
