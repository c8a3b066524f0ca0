//! HTTP method as a typed enum, and the verb filter derived from method names.
//!
//! Only the nine RFC 9110 methods exist here. They double as the stop words
//! stripped out of a declared method name: `ItemPOST` is the route `Item`,
//! reachable with `POST` only.
//!
//! Unknown method strings are rejected at the server level with
//! `405 Method Not Allowed` before they ever reach a route.

use std::fmt;
use std::str::FromStr;

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    /// Every method. No wire name is a prefix of another, so scan order is free.
    pub const ALL: [Method; 9] = [
        Self::Connect,
        Self::Options,
        Self::Delete,
        Self::Patch,
        Self::Trace,
        Self::Head,
        Self::Post,
        Self::Get,
        Self::Put,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|m| m.as_str() == s).ok_or(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── MethodFilter ──────────────────────────────────────────────────────────────

/// The set of methods a route answers to. Empty means any method.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MethodFilter(Vec<Method>);

impl MethodFilter {
    pub fn any() -> Self {
        Self(Vec::new())
    }

    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    pub fn allows(&self, method: Method) -> bool {
        self.is_any() || self.0.contains(&method)
    }

    /// Whether some request method would be accepted by both filters.
    pub fn overlaps(&self, other: &MethodFilter) -> bool {
        self.is_any() || other.is_any() || self.0.iter().any(|m| other.0.contains(m))
    }

    pub fn methods(&self) -> &[Method] {
        &self.0
    }

    fn insert(&mut self, method: Method) {
        if let Err(at) = self.0.binary_search(&method) {
            self.0.insert(at, method);
        }
    }
}

impl FromIterator<Method> for MethodFilter {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        let mut filter = Self::any();
        for method in iter {
            filter.insert(method);
        }
        filter
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("*");
        }
        for (i, method) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(method.as_str())?;
        }
        Ok(())
    }
}

/// Removes every uppercase verb from `name`, returning what is left and the
/// verbs that were found.
///
/// Single left-to-right pass: characters that become adjacent after a removal
/// are not scanned again, so `GEGETT` leaves `GET` behind as plain text.
pub(crate) fn strip_verbs(name: &str) -> (String, MethodFilter) {
    let mut rest = String::with_capacity(name.len());
    let mut found = MethodFilter::any();
    let mut tail = name;

    'scan: while let Some(c) = tail.chars().next() {
        for method in Method::ALL {
            if let Some(after) = tail.strip_prefix(method.as_str()) {
                found.insert(method);
                tail = after;
                continue 'scan;
            }
        }
        rest.push(c);
        tail = &tail[c.len_utf8()..];
    }

    (rest, found)
}
