use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use glass::{Api, ContentType, Method, Request, Resource, Response, ResponseWriter, Router, Status};

#[derive(Default)]
struct Gate {
    flips: AtomicUsize,
    middleware_calls: AtomicUsize,
    index_calls: AtomicUsize,
    successes: AtomicUsize,
    fails: AtomicUsize,
}

impl Gate {
    fn middleware(&self, w: ResponseWriter, r: Request) {
        self.middleware_calls.fetch_add(1, Ordering::SeqCst);
        w.content_type(ContentType::Html);

        if r.request_uri() == "/" {
            let target = if self.flips.fetch_add(1, Ordering::SeqCst) % 2 == 0 { "Success" } else { "Fail" };
            w.redirect(&r, target, Status::Found);
        }
    }

    fn index(&self) {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn success(&self) -> String {
        let n = self.successes.fetch_add(1, Ordering::SeqCst) + 1;
        format!(r#"Yes! You did it! Total Success: {n} <a href="/">Try again</a>"#)
    }

    fn fail(&self) -> String {
        let n = self.fails.fetch_add(1, Ordering::SeqCst) + 1;
        format!(r#"Not on my watch! Total Fail: {n} <a href="/">Try again</a>"#)
    }
}

impl Resource for Gate {
    fn expose(api: &mut Api<Self>) {
        api.method("Middleware", Gate::middleware)
            .method("IndexGET", Gate::index)
            .method("Success", Gate::success)
            .method("Fail", Gate::fail);
    }
}

fn setup() -> (Arc<Gate>, Router) {
    let gate = Arc::new(Gate::default());
    let router = Router::new(Arc::clone(&gate)).unwrap();
    (gate, router)
}

fn get(router: &Router, target: &str) -> Response {
    router.dispatch(Request::new(Method::Get, target))
}

#[test]
fn middleware_is_not_a_route() {
    let (gate, router) = setup();

    assert!(router.root().has_middleware());
    assert!(router.routes().iter().all(|r| r.method() != "Middleware"));

    assert_eq!(get(&router, "/Middleware").status_code(), 404);
    assert_eq!(gate.middleware_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn redirect_short_circuits_the_route() {
    let (gate, router) = setup();

    let res = get(&router, "/");
    assert_eq!(res.status_code(), 302);
    assert_eq!(res.header("location"), Some("/Success"));

    let res = get(&router, "/");
    assert_eq!(res.header("location"), Some("/Fail"));

    assert_eq!(gate.middleware_calls.load(Ordering::SeqCst), 2);
    assert_eq!(gate.index_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn route_runs_once_after_middleware() {
    let (gate, router) = setup();

    let res = get(&router, "/Success");
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(res.body_text(), r#"Yes! You did it! Total Success: 1 <a href="/">Try again</a>"#);

    get(&router, "/Fail");
    get(&router, "/Fail");

    assert_eq!(gate.middleware_calls.load(Ordering::SeqCst), 3);
    assert_eq!(gate.successes.load(Ordering::SeqCst), 1);
    assert_eq!(gate.fails.load(Ordering::SeqCst), 2);
}

#[test]
fn method_filter_is_checked_before_middleware() {
    let (gate, router) = setup();

    let res = router.dispatch(Request::new(Method::Post, "/"));
    assert_eq!(res.status_code(), 405);
    assert_eq!(gate.middleware_calls.load(Ordering::SeqCst), 0);
}
