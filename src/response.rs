//! Outgoing HTTP response types.
//!
//! Two sides of the same thing:
//!
//! - [`ResponseWriter`] is the handle a method declares as a parameter to
//!   write headers, a status and body bytes while it runs. The status and body
//!   return slots of a route write through the same handle after the call.
//! - [`Response`] is what is left once the request is done: status, headers,
//!   body. [`Router::dispatch`](crate::Router::dispatch) returns it.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use parking_lot::Mutex;
use tracing::warn;

use crate::request::Request;
use crate::status::Status;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseWriter::content_type`].
pub enum ContentType {
    Csv,          // text/csv
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream  (binary / file download)
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// A finished HTTP response.
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Bytes,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` with `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: Bytes::from(body.into()),
            headers: vec![("content-type".to_owned(), ContentType::Text.as_str().to_owned())],
            status: Status::Ok.into(),
        }
    }

    /// Response with no body.
    pub fn status(code: impl Into<u16>) -> Self {
        Self { body: Bytes::new(), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The body as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the `http` crate's response for hyper.
    ///
    /// Codes outside `100..=999` cannot go on the wire and become `500`;
    /// headers that are not valid HTTP are dropped. Both are logged.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = StatusCode::from_u16(self.status).unwrap_or_else(|_| {
            warn!(status = self.status, "status code cannot be sent, answering 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });
        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: impl Into<u16>) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with no body (e.g. `Status::NoContent`, `Status::MethodNotAllowed`).
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Draft {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// The response being written for the current request.
///
/// Declare it as a method parameter to write directly. Clones share the same
/// response. Writes follow the usual commit rules:
///
/// - the first status written wins, later ones are ignored;
/// - writing body bytes commits `200 OK` if no status was written yet;
/// - headers set after the status is committed are ignored.
#[derive(Clone, Default)]
pub struct ResponseWriter(Arc<Mutex<Draft>>);

impl ResponseWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing any previous value with the same name.
    pub fn set_header(&self, name: &str, value: impl Into<String>) {
        let mut draft = self.0.lock();
        if draft.status.is_some() {
            warn!(header = name, "header set after the status was written, ignoring");
            return;
        }
        draft.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        draft.headers.push((name.to_owned(), value.into()));
    }

    /// Case-insensitive lookup of a header written so far.
    pub fn header(&self, name: &str) -> Option<String> {
        self.0.lock().headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    pub fn content_type(&self, content_type: ContentType) {
        self.set_header("content-type", content_type.as_str());
    }

    pub fn write_status(&self, code: impl Into<u16>) {
        let code = code.into();
        let mut draft = self.0.lock();
        match draft.status {
            Some(prev) => warn!(prev, code, "superfluous status write, ignoring"),
            None => draft.status = Some(code),
        }
    }

    /// Appends body bytes, committing `200 OK` first if needed.
    pub fn write(&self, bytes: impl AsRef<[u8]>) {
        let mut draft = self.0.lock();
        draft.status.get_or_insert(Status::Ok.into());
        draft.body.extend_from_slice(bytes.as_ref());
    }

    /// Redirects to `location` with `code`.
    ///
    /// A relative `location` is resolved against the directory of the
    /// request path: `Success` requested from `/` becomes `/Success`.
    pub fn redirect(&self, req: &Request, location: &str, code: impl Into<u16>) {
        self.set_header("location", resolve_location(req.path(), location));
        self.write_status(code);
    }

    /// The `Location` header, when it is set and non-empty.
    pub(crate) fn redirected(&self) -> bool {
        self.header("location").is_some_and(|l| !l.is_empty())
    }

    pub(crate) fn finish(self) -> Response {
        let draft = std::mem::take(&mut *self.0.lock());
        let mut headers = draft.headers;
        if !draft.body.is_empty() && !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-type")) {
            headers.push(("content-type".to_owned(), ContentType::Text.as_str().to_owned()));
        }
        Response {
            body: Bytes::from(draft.body),
            headers,
            status: draft.status.unwrap_or(Status::Ok.into()),
        }
    }
}

/// Resolves a redirect target relative to `base`, the current request path.
fn resolve_location(base: &str, location: &str) -> String {
    if location.contains("://") || location.starts_with('/') {
        return location.to_owned();
    }

    let dir = base.rfind('/').map_or("/", |at| &base[..=at]);
    let mut segments: Vec<&str> = Vec::new();
    let joined = format!("{dir}{location}");
    for segment in joined.split('/').skip(1) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}
