use std::any::Any;
use std::sync::Arc;

use glass::{Api, ArgKind, Error, Param, Resource, Router, Status};

fn build<T: Resource>(origin: T) -> Error {
    match Router::new(Arc::new(origin)) {
        Ok(_) => panic!("construction should fail"),
        Err(e) => e,
    }
}

struct ThreeReturns;

impl ThreeReturns {
    fn i_should_not_work(&self) -> (i32, i32, i32) { (1, 2, 3) }
}

impl Resource for ThreeReturns {
    fn expose(api: &mut Api<Self>) {
        api.method("IShouldNotWork", ThreeReturns::i_should_not_work);
    }
}

#[test]
fn three_returns_fail() {
    let err = build(ThreeReturns);
    assert!(matches!(&err, Error::TooManyReturns { method, count: 3 } if method == "IShouldNotWork"));
}

struct TwoBodies;

impl TwoBodies {
    fn page(&self) -> (String, &'static str) { (String::new(), "") }
}

impl Resource for TwoBodies {
    fn expose(api: &mut Api<Self>) {
        api.method("Page", TwoBodies::page);
    }
}

struct TwoStatuses;

impl TwoStatuses {
    fn page(&self) -> (i32, Status) { (200, Status::Ok) }
}

impl Resource for TwoStatuses {
    fn expose(api: &mut Api<Self>) {
        api.method("Page", TwoStatuses::page);
    }
}

#[test]
fn duplicate_slots_fail() {
    assert!(matches!(build(TwoBodies), Error::DuplicateSlot { slot: "body", .. }));
    assert!(matches!(build(TwoStatuses), Error::DuplicateSlot { slot: "status", .. }));
}

struct FloatReturn;

impl FloatReturn {
    fn ratio(&self) -> f64 { 0.5 }
}

impl Resource for FloatReturn {
    fn expose(api: &mut Api<Self>) {
        api.method("Ratio", FloatReturn::ratio);
    }
}

#[test]
fn unsupported_return_fails() {
    assert!(matches!(build(FloatReturn), Error::UnsupportedReturn { ty: "f64", .. }));
}

struct Scalars<const N: usize>;

impl<const N: usize> Scalars<N> {
    fn unsigned(&self, _n: u32) {}
    fn float(&self, _s: String, _f: f64) {}
    fn flag(&self, _b: bool) {}
}

impl<const N: usize> Resource for Scalars<N> {
    fn expose(api: &mut Api<Self>) {
        match N {
            0 => api.method("Unsigned", Self::unsigned),
            1 => api.method("Float", Self::float),
            _ => api.method("Flag", Self::flag),
        };
    }
}

#[test]
fn unsupported_scalars_fail() {
    let err = build(Scalars::<0>);
    assert!(matches!(&err, Error::UnsupportedArg { arg, ty: "u32", .. } if arg == "param-1"));
    assert_eq!(err.to_string(), "`Unsigned`: param-1 has unsupported type `u32`");

    assert!(matches!(build(Scalars::<1>), Error::UnsupportedArg { ty: "f64", .. }));
    assert!(matches!(build(Scalars::<2>), Error::UnsupportedArg { ty: "bool", .. }));
}

struct Point;

impl Param for Point {
    const KIND: ArgKind = ArgKind::Structured("Point");
}

struct SaveOnly;

impl Resource for SaveOnly {
    fn expose(api: &mut Api<Self>) {
        api.method("Save", |_: &SaveOnly, _p: Point| {});
    }
}

struct AnyOnly;

impl Resource for AnyOnly {
    fn expose(api: &mut Api<Self>) {
        api.method("Any", |_: &AnyOnly, _v: Box<dyn Any + Send>| {});
    }
}

#[test]
fn structured_params_fail() {
    assert!(matches!(build(SaveOnly), Error::UnsupportedArg { ty: "Point", .. }));
    assert!(matches!(build(AnyOnly), Error::UnsupportedArg { ty: "Box<dyn Any + Send>", .. }));
}

struct Twice;

impl Twice {
    fn a(&self) {}
    fn b(&self) {}
}

impl Resource for Twice {
    fn expose(api: &mut Api<Self>) {
        api.method("Item", Twice::a).method("Item", Twice::b);
    }
}

struct Clash;

impl Clash {
    fn a(&self) {}
    fn b(&self) -> &'static str { "" }
}

impl Resource for Clash {
    fn expose(api: &mut Api<Self>) {
        api.method("ItemGET", Clash::a).method("Item", Clash::b);
    }
}

struct Split;

impl Split {
    fn read(&self) {}
    fn write(&self) {}
}

impl Resource for Split {
    fn expose(api: &mut Api<Self>) {
        api.method("ItemGET", Split::read).method("ItemPOST", Split::write);
    }
}

#[test]
fn duplicate_names_and_patterns_fail() {
    assert!(matches!(build(Twice), Error::DuplicateMethod { method } if method == "Item"));
    assert!(matches!(build(Clash), Error::Conflict { pattern, .. } if pattern == "/Item"));
    assert!(Router::new(Arc::new(Split)).is_ok());
}

struct Lazy;

impl Lazy {
    fn broken(&self, _f: f64) {}
    fn fine(&self) {}
}

impl Resource for Lazy {
    fn expose(api: &mut Api<Self>) {
        api.method("broken", Lazy::broken).method("Fine", Lazy::fine);
    }
}

#[test]
fn private_methods_are_never_built() {
    let router = Router::new(Arc::new(Lazy)).unwrap();
    assert_eq!(router.routes().len(), 1);
}

struct Parent {
    child: Arc<FloatReturn>,
}

impl Resource for Parent {
    fn expose(api: &mut Api<Self>) {
        api.field("Child", |p| &p.child);
    }
}

#[test]
fn child_errors_abort_the_parent() {
    let err = build(Parent { child: Arc::new(FloatReturn) });
    assert!(matches!(err, Error::UnsupportedReturn { .. }));
}

struct BadMiddleware;

impl BadMiddleware {
    fn middleware(&self, _n: u8) {}
}

impl Resource for BadMiddleware {
    fn expose(api: &mut Api<Self>) {
        api.method("Middleware", BadMiddleware::middleware);
    }
}

#[test]
fn middleware_shape_is_checked_too() {
    assert!(matches!(build(BadMiddleware), Error::UnsupportedArg { ty: "u8", .. }));
}

struct KeyedMiddleware;

impl KeyedMiddleware {
    fn middleware(&self, _w: glass::ResponseWriter, _id: i64) {}
    fn product(&self, _id: i64) {}
}

impl Resource for KeyedMiddleware {
    fn expose(api: &mut Api<Self>) {
        api.method("Middleware", KeyedMiddleware::middleware)
            .method("Product", KeyedMiddleware::product);
    }
}

struct NamedMiddleware;

impl Resource for NamedMiddleware {
    fn expose(api: &mut Api<Self>) {
        api.method("Middleware", |_: &NamedMiddleware, _name: String| {});
    }
}

#[test]
fn middleware_cannot_take_path_variables() {
    let err = build(KeyedMiddleware);
    assert!(matches!(&err, Error::MiddlewarePathArg { method, arg, ty: "i64" }
        if method == "Middleware" && arg == "param-2"));
    assert_eq!(
        err.to_string(),
        "`Middleware`: param-2 of type `i64` is a path variable, middleware cannot take one",
    );

    assert!(matches!(build(NamedMiddleware), Error::MiddlewarePathArg { ty: "String", .. }));
}
