//! Incoming HTTP request type.

use bytes::Bytes;
use percent_encoding::percent_decode_str;

use crate::method::Method;

/// An incoming HTTP request, detached from the connection it arrived on.
///
/// The hosting server builds one per request from the hyper request; tests
/// and other hosts can build one directly:
///
/// ```rust
/// use sprig::{Method, Request};
///
/// let req = Request::new(Method::Post, "/login?next=%2Fhome")
///     .with_header("content-type", "application/x-www-form-urlencoded")
///     .with_body("user=geektutu");
/// assert_eq!(req.path(), "/login");
/// assert_eq!(req.query("next").as_deref(), Some("/home"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Request {
    /// Builds a request for `target`, an origin-form path with an optional
    /// `?query` suffix.
    ///
    /// The path is percent-decoded (invalid UTF-8 is replaced), so routing,
    /// group prefixes and bound parameters all see `/hello/Jürgen` for
    /// `/hello/J%C3%BCrgen`. The query string is kept encoded.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        let path = if path.is_empty() { "/" } else { path };
        Self {
            method,
            path: percent_decode_str(path).decode_utf8_lossy().into_owned(),
            query,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query_string(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first URL-decoded query parameter named `key`.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        lookup_urlencoded(query.as_bytes(), key)
    }

    /// Returns a form field from an `application/x-www-form-urlencoded`
    /// body, falling back to the query string.
    pub fn post_form(&self, key: &str) -> Option<String> {
        let is_form = self.header("content-type").is_some_and(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        });
        if is_form {
            if let Some(value) = lookup_urlencoded(&self.body, key) {
                return Some(value);
            }
        }
        self.query(key)
    }
}

fn lookup_urlencoded(input: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(input)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
