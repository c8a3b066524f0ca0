//! A tiny store: every method of `Store` is a route.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example store
//!
//! Try:
//!   curl http://localhost:3000/Home
//!   curl -i http://localhost:3000/Product/1
//!   curl -i http://localhost:3000/Product/9          → 302 to /Home
//!   curl -X POST http://localhost:3000/Cart/Add/2
//!   curl http://localhost:3000/Cart/Count
//!   curl -i -X DELETE http://localhost:3000/Cart/Clear

use std::sync::Arc;
use std::time::Duration;

use glass::{Api, ContentType, Request, Resource, ResponseWriter, Router, Server, Status};
use parking_lot::Mutex;

struct Store {
    items: Vec<&'static str>,
    cart: Arc<Cart>,
}

impl Store {
    // GET /
    fn index(&self, w: ResponseWriter, r: Request) {
        w.redirect(&r, "Home", Status::Found);
    }

    // /Home
    fn home(&self, w: ResponseWriter) {
        w.content_type(ContentType::Html);
        w.write("<h1>Welcome to the store!</h1>\n");
        for (id, name) in self.items.iter().enumerate() {
            w.write(format!("<a href=\"/Product/{id}\">{name}</a><br>\n"));
        }
    }

    // /Product/{param-1}
    fn product(&self, id: isize, w: ResponseWriter, r: Request) -> (i32, String) {
        let Some(name) = usize::try_from(id).ok().and_then(|i| self.items.get(i)) else {
            w.redirect(&r, "/Home", Status::Found);
            return (-1, String::new());
        };
        (200, format!("A very good {name} indeed. Would recommend."))
    }
}

impl Resource for Store {
    fn expose(api: &mut Api<Self>) {
        api.method("IndexGET", Store::index)
            .method("Home", Store::home)
            .method("Product", Store::product)
            .field("Cart", |s| &s.cart);
    }
}

#[derive(Default)]
struct Cart {
    lines: Mutex<Vec<isize>>,
}

impl Cart {
    // Every cart route answers JSON.
    fn middleware(&self, w: ResponseWriter) {
        w.content_type(ContentType::Json);
    }

    // POST /Cart/Add/{param-1}
    fn add(&self, id: isize) -> (Status, String) {
        let mut lines = self.lines.lock();
        lines.push(id);
        (Status::Created, format!(r#"{{"count":{}}}"#, lines.len()))
    }

    // /Cart/Count
    fn count(&self) -> String {
        format!(r#"{{"count":{}}}"#, self.lines.lock().len())
    }

    // DELETE /Cart/Clear
    fn clear(&self) -> Status {
        self.lines.lock().clear();
        Status::NoContent
    }
}

impl Resource for Cart {
    fn expose(api: &mut Api<Self>) {
        api.method("Middleware", Cart::middleware)
            .method("AddPOST", Cart::add)
            .method("Count", Cart::count)
            .method("ClearDELETE", Cart::clear);
    }
}

#[tokio::main]
async fn main() -> Result<(), glass::Error> {
    tracing_subscriber::fmt::init();

    let store = Store {
        items: vec!["Book", "Chair", "Something"],
        cart: Arc::new(Cart::default()),
    };
    let app = Router::new(Arc::new(store))?;

    for route in app.routes() {
        tracing::info!(pattern = route.pattern(), methods = %route.methods(), "route");
    }

    Server::bind("0.0.0.0:3000")?
        .grace(Duration::from_secs(10))
        .serve(app)
        .await
}
