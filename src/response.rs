//! Outgoing HTTP response type and [`ContentType`].
//!
//! Handlers never build a [`Response`] themselves: they write through the
//! [`Context`](crate::Context) helpers, which accumulate status, headers and
//! body here. [`Engine::dispatch`](crate::Engine::dispatch) hands the finished
//! value back to the host.

use std::path::Path;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for [`Context::bytes`](crate::Context::bytes)
/// and static-file serving.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Css,          // text/css; charset=utf-8
    Csv,          // text/csv
    Gif,          // image/gif
    Html,         // text/html; charset=utf-8
    Icon,         // image/x-icon
    Javascript,   // text/javascript; charset=utf-8
    Jpeg,         // image/jpeg
    Json,         // application/json
    OctetStream,  // application/octet-stream  (binary / unknown)
    Pdf,          // application/pdf
    Png,          // image/png
    Svg,          // image/svg+xml
    Text,         // text/plain; charset=utf-8
    Wasm,         // application/wasm
    Webp,         // image/webp
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Css         => "text/css; charset=utf-8",
            Self::Csv         => "text/csv",
            Self::Gif         => "image/gif",
            Self::Html        => "text/html; charset=utf-8",
            Self::Icon        => "image/x-icon",
            Self::Javascript  => "text/javascript; charset=utf-8",
            Self::Jpeg        => "image/jpeg",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Png         => "image/png",
            Self::Svg         => "image/svg+xml",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Wasm        => "application/wasm",
            Self::Webp        => "image/webp",
            Self::Xml         => "application/xml",
        }
    }

    /// Guesses from a file extension (case-insensitive); unknown extensions
    /// are [`ContentType::OctetStream`].
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "css"          => Self::Css,
            "csv"          => Self::Csv,
            "gif"          => Self::Gif,
            "htm" | "html" => Self::Html,
            "ico"          => Self::Icon,
            "js" | "mjs"   => Self::Javascript,
            "jpg" | "jpeg" => Self::Jpeg,
            "json" | "map" => Self::Json,
            "pdf"          => Self::Pdf,
            "png"          => Self::Png,
            "svg"          => Self::Svg,
            "txt"          => Self::Text,
            "wasm"         => Self::Wasm,
            "webp"         => Self::Webp,
            "xml"          => Self::Xml,
            _              => Self::OctetStream,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::OctetStream, Self::from_extension)
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// Starts as `200 OK` with no headers and an empty body; the last status or
/// body write wins.
#[derive(Clone, Debug)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
}

impl Response {
    pub(crate) fn new() -> Self {
        Self { status: StatusCode::OK, headers: Vec::new(), body: Bytes::new() }
    }

    /// A plain-text response, used by the server for errors raised before
    /// dispatch.
    pub(crate) fn plain(status: StatusCode, body: impl Into<String>) -> Self {
        let mut response = Self::new();
        response.status = status;
        response.set_header("content-type", ContentType::Text.as_str());
        response.body = Bytes::from(body.into());
        response
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The body as UTF-8 text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Sets `name`, replacing any header with the same (case-insensitive) name.
    pub(crate) fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Converts into the `http` crate's response for hyper.
    ///
    /// A header that is not valid on the wire turns the whole response into
    /// a bare `500`.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Full::new(self.body)).unwrap_or_else(|_| {
            let mut fallback = http::Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(ContentType::from_extension("CSS"), ContentType::Css);
        assert_eq!(ContentType::from_extension("js"), ContentType::Javascript);
        assert_eq!(ContentType::from_extension("tar"), ContentType::OctetStream);
        assert_eq!(ContentType::from_path(Path::new("a/b/index.html")), ContentType::Html);
        assert_eq!(ContentType::from_path(Path::new("Makefile")), ContentType::OctetStream);
    }

    #[test]
    fn set_header_replaces_same_name() {
        let mut res = Response::new();
        res.set_header("X-Trace", "1");
        res.set_header("x-trace", "2");
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.header("X-TRACE"), Some("2"));
    }

    #[test]
    fn into_http_carries_status_headers_and_body() {
        let res = Response::plain(StatusCode::NOT_FOUND, "gone");
        let http = res.into_http();
        assert_eq!(http.status(), StatusCode::NOT_FOUND);
        assert_eq!(http.headers()["content-type"], "text/plain; charset=utf-8");
    }

    #[test]
    fn invalid_header_becomes_server_error() {
        let mut res = Response::new();
        res.set_header("bad header", "x");
        assert_eq!(res.into_http().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
