use std::sync::Arc;
use std::time::Duration;

use glass::{Api, Resource, Router, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

struct Hello;

impl Hello {
    fn hello(&self) -> &'static str { "world!" }

    fn greet(&self, name: String) -> (i32, String) {
        (201, format!("hi {name}"))
    }
}

impl Resource for Hello {
    fn expose(api: &mut Api<Self>) {
        api.method("Hello", Hello::hello).method("GreetPOST", Hello::greet);
    }
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn connect(port: u16) -> TcpStream {
    for _ in 0..50 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not come up on port {port}");
}

async fn send(port: u16, method: &str, path: &str) -> String {
    let mut stream = connect(port).await;
    let head = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    raw
}

/// Sends only a request head and reads until the response head is complete,
/// so the server has to answer without waiting for the announced body.
async fn send_head(port: u16, method: &str, path: &str, content_length: u64) -> String {
    let mut stream = connect(port).await;
    let head = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {content_length}\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();

    let read = async {
        let mut raw: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => raw.extend_from_slice(&buf[..n]),
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    };
    tokio::time::timeout(Duration::from_secs(2), read)
        .await
        .expect("no response head within 2s")
}

#[tokio::test]
async fn serves_routes_over_http() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let port = free_port();
    let router = Router::new(Arc::new(Hello)).unwrap();
    let server = Server::bind(&format!("127.0.0.1:{port}")).unwrap().grace(Duration::from_secs(1));

    let (stop, stopped) = oneshot::channel::<()>();
    let serving = tokio::spawn(server.serve_with_shutdown(router, async {
        stopped.await.ok();
    }));

    let ok = send(port, "GET", "/Hello").await;
    assert!(ok.starts_with("HTTP/1.1 200"), "{ok}");
    assert!(ok.ends_with("world!"), "{ok}");

    let created = send(port, "POST", "/Greet/ana").await;
    assert!(created.starts_with("HTTP/1.1 201"), "{created}");
    assert!(created.ends_with("hi ana"), "{created}");

    let wrong_method = send(port, "GET", "/Greet/ana").await;
    assert!(wrong_method.starts_with("HTTP/1.1 405"), "{wrong_method}");
    assert!(wrong_method.to_ascii_lowercase().contains("allow: post"), "{wrong_method}");

    let missing = send(port, "GET", "/Nope").await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    stop.send(()).unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn bodies_are_capped_and_unrouted_requests_skip_them() {
    let port = free_port();
    let router = Router::new(Arc::new(Hello)).unwrap();
    let server = Server::bind(&format!("127.0.0.1:{port}")).unwrap().max_body(16);

    let (stop, stopped) = oneshot::channel::<()>();
    let serving = tokio::spawn(server.serve_with_shutdown(router, async {
        stopped.await.ok();
    }));

    let missing = send_head(port, "POST", "/Nope", 4_294_967_296).await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    let too_large = send_head(port, "POST", "/Hello", 4_294_967_296).await;
    assert!(too_large.starts_with("HTTP/1.1 413"), "{too_large}");

    let mut stream = connect(port).await;
    let request = "POST /Hello HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\nConnection: close\r\n\r\nsmall";
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut small = String::new();
    stream.read_to_string(&mut small).await.unwrap();
    assert!(small.starts_with("HTTP/1.1 200"), "{small}");
    assert!(small.ends_with("world!"), "{small}");

    stop.send(()).unwrap();
    serving.await.unwrap().unwrap();
}

#[test]
fn bind_rejects_bad_addresses() {
    assert!(matches!(Server::bind("not an address"), Err(glass::Error::Addr(_))));
}
