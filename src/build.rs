//! Route building: URL patterns, argument decoders and the result encoder.
//!
//! Path-variable names are the only link between a URL segment and the
//! argument slot it fills, so the pattern lists them strictly in declaration
//! order.

use std::str::FromStr;

use tracing::{debug, warn};

use crate::analyze::{Arg, OutputSlot, RouteSpec, Slot};
use crate::config::Decoding;
use crate::handler::{Exchange, Rejection};
use crate::response::ResponseWriter;
use crate::signature::{Decoder, Returned};

/// The route's pattern relative to its mount: `/Name/{param-1}/…`.
pub(crate) fn pattern(spec: &RouteSpec) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(spec.args().len() + 1);
    if !spec.name().is_empty() {
        segments.push(spec.name().to_owned());
    }
    segments.extend(
        spec.args().iter()
            .filter(|arg| arg.in_url())
            .map(|arg| format!("{{{}}}", arg.name())),
    );
    format!("/{}", segments.join("/"))
}

/// Mounts a relative pattern under `prefix` (`""` for the root).
pub(crate) fn join(prefix: &str, pattern: &str) -> String {
    match (prefix.is_empty(), pattern == "/") {
        (true, _) => pattern.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}{pattern}"),
    }
}

// ── Decoders ──────────────────────────────────────────────────────────────────

/// A string path variable. A missing variable decodes as `""`.
pub(crate) fn path_str(arg: &Arg) -> Decoder<String> {
    let name = arg.name().to_owned();
    Box::new(move |ex: &Exchange| Ok(ex.request.param(&name).unwrap_or_default().to_owned()))
}

/// Signed integers a path variable can decode to.
pub(crate) trait PathInt: FromStr + Default + Send + 'static {
    /// Truncates to this width, wrapping around.
    fn wrap(value: i64) -> Self;
}

macro_rules! path_int {
    ($($t:ty),*) => {$(
        impl PathInt for $t {
            fn wrap(value: i64) -> Self { value as $t }
        }
    )*};
}

path_int!(i8, i16, i32, i64, isize);

/// A base-10 integer path variable.
///
/// Lenient: parsed as `i64` and wrapped to the target width; anything that
/// is not a base-10 `i64` decodes as zero. Strict: the value must parse at
/// the target width, otherwise the request is rejected.
pub(crate) fn path_int<T: PathInt>(arg: &Arg, decoding: Decoding) -> Decoder<T> {
    let name = arg.name().to_owned();
    match decoding {
        Decoding::Lenient => Box::new(move |ex: &Exchange| {
            let raw = ex.request.param(&name).unwrap_or_default();
            Ok(match raw.parse::<i64>() {
                Ok(value) => T::wrap(value),
                Err(_) => {
                    debug!(arg = %name, value = raw, "path variable is not an integer, using zero");
                    T::default()
                }
            })
        }),
        Decoding::Strict => Box::new(move |ex: &Exchange| {
            let raw = ex.request.param(&name).unwrap_or_default();
            raw.parse::<T>().map_err(|_| Rejection {
                arg: name.clone(),
                value: raw.to_owned(),
            })
        }),
    }
}

// ── Encoder ───────────────────────────────────────────────────────────────────

/// Writes a method's returned values into the response.
pub(crate) struct Encoder {
    status: Option<usize>,
    body: Option<usize>,
}

impl Encoder {
    pub(crate) fn new(outputs: &[OutputSlot]) -> Self {
        let at = |slot| outputs.iter().find(|o| o.slot == slot).map(|o| o.position);
        Self { status: at(Slot::Status), body: at(Slot::Body) }
    }

    /// Status first, then body, whatever their positions in the return tuple.
    /// A non-positive status and an empty body write nothing.
    pub(crate) fn encode(&self, mut values: Vec<Returned>, writer: &ResponseWriter) {
        if let Some(&Returned::Status(code)) = self.status.and_then(|at| values.get(at)) {
            if code > 0 {
                match u16::try_from(code) {
                    Ok(code) => writer.write_status(code),
                    Err(_) => warn!(code, "returned status does not fit a status code, ignoring"),
                }
            }
        }
        if let Some(Returned::Body(body)) = self.body.and_then(|at| values.get_mut(at)) {
            if !body.is_empty() {
                writer.write(std::mem::take(body));
            }
        }
    }
}
