//! HTTP server and graceful shutdown.
//!
//! The server is the thinnest possible host for a [`Router`]: it accepts
//! connections, turns each hyper request into a [`Request`], calls
//! [`Router::dispatch`] and writes the [`Response`](crate::Response) back.
//!
//! The request line is routed before the body is touched: `404`, `405` and
//! `400` are answered without reading a byte of it. A routed body is read up
//! to [`Server::max_body`] bytes; anything larger is answered with `413`.
//!
//! # Graceful shutdown
//!
//! On shutdown (SIGTERM / Ctrl-C for [`Server::serve`], any future for
//! [`Server::serve_with_shutdown`]) the server:
//! 1. Immediately stops `listener.accept()`; no new connections are made.
//! 2. Lets every in-flight connection task run to completion, for at most
//!    the [grace period](Server::grace) when one is set.
//! 3. Returns, which lets `main` exit cleanly.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body as _;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// Default cap on a request body, in bytes.
const MAX_BODY: usize = 2 * 1024 * 1024;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    grace: Option<Duration>,
    max_body: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when it starts serving.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use glass::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self { addr: addr.parse()?, grace: None, max_body: MAX_BODY })
    }

    /// Caps request bodies at `bytes` (2 MiB by default). Larger bodies are
    /// answered with `413 Payload Too Large`.
    pub fn max_body(mut self, bytes: usize) -> Self {
        self.max_body = bytes;
        self
    }

    /// Bounds how long shutdown waits for in-flight connections.
    /// Connections still open after `grace` are aborted.
    pub fn grace(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);

        info!(addr = %self.addr, "glass listening");

        let max_body = self.max_body;
        let mut tasks = JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Shutdown is checked first so a signal stops accepting new
                // connections even if more are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { handle(&router, req, max_body).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        let drain = async { while tasks.join_next().await.is_some() {} };
        match self.grace {
            Some(grace) => {
                if tokio::time::timeout(grace, drain).await.is_err() {
                    warn!(aborted = tasks.len(), "grace period over, aborting connections");
                    tasks.abort_all();
                }
            }
            None => drain.await,
        }

        info!("glass stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Converts one hyper request, dispatches it, converts the response back.
///
/// The error type is [`Infallible`](std::convert::Infallible): failures are
/// answered with a status so hyper never sees an error.
async fn handle(
    router: &Router,
    req: hyper::Request<hyper::body::Incoming>,
    max_body: usize,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let Ok(method) = parts.method.as_str().parse::<Method>() else {
        return Ok(Response::status(Status::MethodNotAllowed).into_http());
    };

    let matched = match router.resolve(method, parts.uri.path()) {
        Ok(matched) => matched,
        Err(res) => return Ok(res.into_http()),
    };

    let limit = u64::try_from(max_body).unwrap_or(u64::MAX);
    if body.size_hint().lower() > limit {
        warn!(declared = body.size_hint().lower(), limit, "request body too large");
        return Ok(Response::status(Status::PayloadTooLarge).into_http());
    }

    let body = match Limited::new(body, max_body).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            warn!(limit, "request body too large");
            return Ok(Response::status(Status::PayloadTooLarge).into_http());
        }
        Err(e) => {
            warn!("failed to read request body: {e}");
            return Ok(Response::status(Status::BadRequest).into_http());
        }
    };

    let target = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let headers = parts.headers.iter()
        .filter_map(|(name, value)| Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned())))
        .collect();

    let request = Request::new(method, target).with_headers(headers).with_body(body);
    Ok(router.call(matched, request).into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT the process receives.
///
/// A signal handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    // `pending()` never resolves, so on non-Unix platforms only Ctrl-C counts.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
