//! Per-request context.
//!
//! A [`Context`] is created for every inbound request and dropped once the
//! response is handed back to the host. It carries the request, the path
//! parameters bound by the router, the response being written, and the
//! middleware chain together with its cursor.
//!
//! # Chain protocol
//!
//! The chain is `[mw1, mw2, …, mwN, handler]`. [`Context::next`] runs
//! exactly one more step; that step continues the chain by awaiting
//! `next()` itself. A step that returns without doing so ends the request
//! there, which is how authorization middleware short-circuits.
//! [`Context::fail`] moves the cursor past the end and writes an error body.
//!
//! ```rust
//! use sprig::{BoxFuture, Context};
//! use http::StatusCode;
//!
//! fn require_token(c: &mut Context) -> BoxFuture<'_> {
//!     Box::pin(async move {
//!         if c.header("x-token").is_none() {
//!             c.fail(StatusCode::UNAUTHORIZED, "missing token");
//!             return;
//!         }
//!         c.next().await;
//!     })
//! }
//! ```

use std::collections::HashMap;

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;

use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::request::Request;
use crate::response::{ContentType, Response};

pub struct Context {
    request: Request,
    params: HashMap<String, String>,
    response: Response,
    chain: Vec<BoxedHandler>,
    // Index of the next step to run; only ever moves forward.
    cursor: usize,
}

impl Context {
    pub(crate) fn new(request: Request, chain: Vec<BoxedHandler>) -> Self {
        Self {
            request,
            params: HashMap::new(),
            response: Response::new(),
            chain,
            cursor: 0,
        }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub(crate) fn push(&mut self, step: BoxedHandler) {
        self.chain.push(step);
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }

    // ── Request side ──────────────────────────────────────────────────────────

    pub fn request(&self) -> &Request { &self.request }
    pub fn method(&self) -> Method { self.request.method() }
    pub fn path(&self) -> &str { self.request.path() }
    pub fn body(&self) -> &[u8] { self.request.body() }
    pub fn header(&self, name: &str) -> Option<&str> { self.request.header(name) }
    pub fn query(&self, key: &str) -> Option<String> { self.request.query(key) }
    pub fn post_form(&self, key: &str) -> Option<String> { self.request.post_form(key) }

    /// Returns a path parameter bound by the matched route.
    ///
    /// For `/hello/:name` on `/hello/geektutu`, `c.param("name")` is
    /// `Some("geektutu")`; for `/assets/*filepath` on `/assets/css/a.css`,
    /// `c.param("filepath")` is `Some("css/a.css")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    // ── Response side ─────────────────────────────────────────────────────────

    pub fn status(&mut self, code: StatusCode) {
        self.response.status = code;
    }

    pub fn status_code(&self) -> StatusCode {
        self.response.status
    }

    /// Drops every response header written so far.
    pub(crate) fn clear_headers(&mut self) {
        self.response.headers.clear();
    }

    /// Sets a response header, replacing any previous value for `name`.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    /// Writes a `text/plain` body.
    pub fn string(&mut self, code: StatusCode, body: impl Into<String>) {
        self.write(code, ContentType::Text, Bytes::from(body.into()));
    }

    /// Writes `value` as an `application/json` body.
    ///
    /// If serialisation fails the response becomes a `500` carrying the
    /// serde error text.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.write(code, ContentType::Json, Bytes::from(body)),
            Err(e) => self.string(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }

    /// Writes raw bytes as `application/octet-stream`.
    pub fn data(&mut self, code: StatusCode, body: impl Into<Bytes>) {
        self.write(code, ContentType::OctetStream, body.into());
    }

    /// Writes raw bytes with an explicit content type.
    pub fn bytes(&mut self, code: StatusCode, content_type: ContentType, body: impl Into<Bytes>) {
        self.write(code, content_type, body.into());
    }

    /// Writes a `text/html` body.
    pub fn html(&mut self, code: StatusCode, html: impl Into<String>) {
        self.write(code, ContentType::Html, Bytes::from(html.into()));
    }

    fn write(&mut self, code: StatusCode, content_type: ContentType, body: Bytes) {
        self.set_header("content-type", content_type.as_str());
        self.status(code);
        self.response.body = body;
    }

    // ── Chain ─────────────────────────────────────────────────────────────────

    /// Runs the next step of the chain, if any.
    ///
    /// Returns once that step (and everything it chose to continue into)
    /// has finished, so code after `next().await` observes the downstream
    /// response.
    pub async fn next(&mut self) {
        let Some(step) = self.chain.get(self.cursor).cloned() else {
            return;
        };
        self.cursor += 1;
        step(self).await;
    }

    /// Aborts the chain and answers `code` with `{"message": message}`.
    ///
    /// Steps that already started keep running to completion, but any later
    /// `next()` is a no-op.
    pub fn fail(&mut self, code: StatusCode, message: &str) {
        self.cursor = self.chain.len();
        self.json(code, &serde_json::json!({ "message": message }));
    }

    /// True once the chain has no further steps to run.
    pub fn is_done(&self) -> bool {
        self.cursor >= self.chain.len()
    }
}
