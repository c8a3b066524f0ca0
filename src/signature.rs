//! What a method's Rust signature says about its route.
//!
//! A method exposed through [`Api::method`](crate::Api::method) is any
//! `Fn(&T, A1, …, An) -> R` (up to eight parameters) where every `Ai`
//! implements [`Param`] and `R` implements [`Outputs`]. The traits carry a
//! kind for each type, so the shape of a route is read off the types once,
//! at construction, and never inspected again.
//!
//! | Parameter type | Kind | In the URL |
//! |---|---|---|
//! | `String` | path variable | yes |
//! | `i8` `i16` `i32` `i64` `isize` | path variable, base-10 | yes |
//! | [`Request`] | injected | no |
//! | [`ResponseWriter`] | injected | no |
//! | `Box<dyn Any + Send>`, your own record types | structured | no, rejected |
//! | `u*`, `f32`, `f64`, `bool`, `char`, `i128` | unsupported | rejected |
//!
//! | Return type | Slot |
//! |---|---|
//! | `String`, `&'static str` | body (empty = no body) |
//! | `i8` `i16` `i32` `i64` `isize`, [`Status`] | status (non-positive = none) |
//! | `()` | nothing |
//! | a pair of the above | one status and one body, in either order |
//!
//! Rejected shapes fail [`Router::new`](crate::Router::new), never a request.

use std::any::Any;
use std::sync::Arc;

use crate::analyze::{Arg, RouteSpec};
use crate::build::{self, Encoder};
use crate::config::Decoding;
use crate::error::Error;
use crate::handler::{Caller, Exchange, Rejection};
use crate::request::Request;
use crate::response::ResponseWriter;
use crate::status::Status;

// ── Kinds ─────────────────────────────────────────────────────────────────────

/// Bit width of a signed integer path variable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
    Size,
}

/// How a parameter is filled at call time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgKind {
    Str,
    Int(Width),
    Request,
    ResponseWriter,
    /// A record or polymorphic value, reserved for body binding.
    Structured(&'static str),
    Unsupported(&'static str),
}

impl ArgKind {
    /// Whether the parameter is bound to a path variable.
    pub fn in_url(self) -> bool {
        matches!(self, Self::Str | Self::Int(_))
    }

    pub(crate) fn type_name(self) -> &'static str {
        match self {
            Self::Str => "String",
            Self::Int(Width::W8) => "i8",
            Self::Int(Width::W16) => "i16",
            Self::Int(Width::W32) => "i32",
            Self::Int(Width::W64) => "i64",
            Self::Int(Width::Size) => "isize",
            Self::Request => "Request",
            Self::ResponseWriter => "ResponseWriter",
            Self::Structured(ty) | Self::Unsupported(ty) => ty,
        }
    }
}

/// Which response slot a returned value feeds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputKind {
    Body,
    Status,
    Unsupported(&'static str),
}

/// The parameter and output kinds of one method, in declaration order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    pub params: Vec<ArgKind>,
    pub outputs: Vec<OutputKind>,
}

// ── Param ─────────────────────────────────────────────────────────────────────

/// Decodes one argument of a bound method from the current request.
#[doc(hidden)]
pub type Decoder<A> = Box<dyn Fn(&Exchange) -> Result<A, Rejection> + Send + Sync + 'static>;

/// A type usable as a method parameter.
///
/// Implement it for your own record types to mark them as structured; such
/// parameters stay out of the URL and are refused at construction until body
/// binding exists:
///
/// ```rust
/// use glass::{ArgKind, Param};
///
/// struct Point { x: i32, y: i32 }
///
/// impl Param for Point {
///     const KIND: ArgKind = ArgKind::Structured("Point");
/// }
/// ```
pub trait Param: Sized + Send + 'static {
    const KIND: ArgKind;

    /// `None` means the type cannot be decoded from a request.
    #[doc(hidden)]
    fn decoder(_arg: &Arg, _decoding: Decoding) -> Option<Decoder<Self>> {
        None
    }
}

impl Param for String {
    const KIND: ArgKind = ArgKind::Str;

    fn decoder(arg: &Arg, _decoding: Decoding) -> Option<Decoder<Self>> {
        Some(build::path_str(arg))
    }
}

macro_rules! int_param {
    ($($t:ty => $width:ident),* $(,)?) => {$(
        impl Param for $t {
            const KIND: ArgKind = ArgKind::Int(Width::$width);

            fn decoder(arg: &Arg, decoding: Decoding) -> Option<Decoder<Self>> {
                Some(build::path_int::<$t>(arg, decoding))
            }
        }
    )*};
}

int_param!(i8 => W8, i16 => W16, i32 => W32, i64 => W64, isize => Size);

impl Param for Request {
    const KIND: ArgKind = ArgKind::Request;

    fn decoder(_arg: &Arg, _decoding: Decoding) -> Option<Decoder<Self>> {
        Some(Box::new(|ex: &Exchange| Ok(ex.request.clone())))
    }
}

impl Param for ResponseWriter {
    const KIND: ArgKind = ArgKind::ResponseWriter;

    fn decoder(_arg: &Arg, _decoding: Decoding) -> Option<Decoder<Self>> {
        Some(Box::new(|ex: &Exchange| Ok(ex.writer.clone())))
    }
}

impl Param for Box<dyn Any + Send> {
    const KIND: ArgKind = ArgKind::Structured("Box<dyn Any + Send>");
}

macro_rules! unsupported_param {
    ($($t:ty),*) => {$(
        impl Param for $t {
            const KIND: ArgKind = ArgKind::Unsupported(stringify!($t));
        }
    )*};
}

unsupported_param!(u8, u16, u32, u64, u128, usize, i128, f32, f64, bool, char);

// ── Output / Outputs ──────────────────────────────────────────────────────────

/// One returned value, tagged with the slot it came from.
#[doc(hidden)]
pub enum Returned {
    Body(String),
    Status(i64),
    Opaque,
}

/// A type usable as one returned value.
pub trait Output: Send + 'static {
    const KIND: OutputKind;

    #[doc(hidden)]
    fn into_returned(self) -> Returned;
}

impl Output for String {
    const KIND: OutputKind = OutputKind::Body;
    fn into_returned(self) -> Returned { Returned::Body(self) }
}

impl Output for &'static str {
    const KIND: OutputKind = OutputKind::Body;
    fn into_returned(self) -> Returned { Returned::Body(self.to_owned()) }
}

impl Output for Status {
    const KIND: OutputKind = OutputKind::Status;
    fn into_returned(self) -> Returned { Returned::Status(i64::from(u16::from(self))) }
}

macro_rules! status_output {
    ($($t:ty),*) => {$(
        impl Output for $t {
            const KIND: OutputKind = OutputKind::Status;
            fn into_returned(self) -> Returned { Returned::Status(self as i64) }
        }
    )*};
}

status_output!(i8, i16, i32, i64, isize);

macro_rules! unsupported_output {
    ($($t:ty),*) => {$(
        impl Output for $t {
            const KIND: OutputKind = OutputKind::Unsupported(stringify!($t));
            fn into_returned(self) -> Returned { Returned::Opaque }
        }
    )*};
}

unsupported_output!(u8, u16, u32, u64, usize, f32, f64, bool, char);

/// Everything a method may return: nothing, one [`Output`], or a tuple of them.
///
/// Tuples of three or four are accepted by the type system so that the
/// router can report them as an error instead of failing to compile.
pub trait Outputs: Send + 'static {
    fn kinds() -> Vec<OutputKind>;

    #[doc(hidden)]
    fn into_returned(self) -> Vec<Returned>;
}

impl Outputs for () {
    fn kinds() -> Vec<OutputKind> { Vec::new() }
    fn into_returned(self) -> Vec<Returned> { Vec::new() }
}

macro_rules! single_outputs {
    ($($t:ty),*) => {$(
        impl Outputs for $t {
            fn kinds() -> Vec<OutputKind> { vec![<$t as Output>::KIND] }
            fn into_returned(self) -> Vec<Returned> { vec![Output::into_returned(self)] }
        }
    )*};
}

single_outputs!(
    String, &'static str, Status,
    i8, i16, i32, i64, isize,
    u8, u16, u32, u64, usize, f32, f64, bool, char
);

macro_rules! tuple_outputs {
    ($($O:ident),+) => {
        impl<$($O: Output),+> Outputs for ($($O,)+) {
            fn kinds() -> Vec<OutputKind> { vec![$($O::KIND),+] }

            #[allow(non_snake_case)]
            fn into_returned(self) -> Vec<Returned> {
                let ($($O,)+) = self;
                vec![$($O.into_returned()),+]
            }
        }
    };
}

tuple_outputs!(A, B);
tuple_outputs!(A, B, C);
tuple_outputs!(A, B, C, D);

// ── Callable ──────────────────────────────────────────────────────────────────

/// A method that can be bound to an origin and called per request.
///
/// You never implement this yourself. It is satisfied by every
/// `Fn(&T, A1, …, An) -> R` with up to eight [`Param`]s and an [`Outputs`]
/// return type, which covers plain methods such as `Shop::product`. `M` is
/// a marker that keeps the impls for each arity apart.
pub trait Callable<T, M>: Send + Sync + 'static {
    fn signature() -> Signature;

    #[doc(hidden)]
    fn bind(self, origin: Arc<T>, spec: &RouteSpec, decoding: Decoding) -> Result<Caller, Error>;
}

fn decoder_for<A: Param>(spec: &RouteSpec, at: usize, decoding: Decoding) -> Result<Decoder<A>, Error> {
    let arg = &spec.args()[at];
    A::decoder(arg, decoding).ok_or_else(|| Error::UnsupportedArg {
        method: spec.method().to_owned(),
        arg: arg.name().to_owned(),
        ty: A::KIND.type_name(),
    })
}

macro_rules! callable {
    ($($A:ident $at:tt),*) => {
        impl<T, F, R, $($A,)*> Callable<T, (R, $($A,)*)> for F
        where
            T: Send + Sync + 'static,
            F: Fn(&T, $($A),*) -> R + Send + Sync + 'static,
            R: Outputs,
            $($A: Param,)*
        {
            fn signature() -> Signature {
                Signature {
                    params: vec![$($A::KIND),*],
                    outputs: R::kinds(),
                }
            }

            #[allow(non_snake_case, unused_variables)]
            fn bind(self, origin: Arc<T>, spec: &RouteSpec, decoding: Decoding) -> Result<Caller, Error> {
                $(let $A = decoder_for::<$A>(spec, $at, decoding)?;)*
                let encoder = Encoder::new(spec.outputs());

                Ok(Arc::new(move |ex: &Exchange| {
                    $(let $A = $A(ex)?;)*
                    let returned = (self)(&origin, $($A),*);
                    encoder.encode(Outputs::into_returned(returned), &ex.writer);
                    Ok(())
                }))
            }
        }
    };
}

callable!();
callable!(A1 0);
callable!(A1 0, A2 1);
callable!(A1 0, A2 1, A3 2);
callable!(A1 0, A2 1, A3 2, A4 3);
callable!(A1 0, A2 1, A3 2, A4 3, A5 4);
callable!(A1 0, A2 1, A3 2, A4 3, A5 4, A6 5);
callable!(A1 0, A2 1, A3 2, A4 3, A5 4, A6 5, A7 6);
callable!(A1 0, A2 1, A3 2, A4 3, A5 4, A6 5, A7 6, A8 7);
