//! HTTP server and graceful shutdown.
//!
//! The server is the host the engine plugs into: it owns the listener and
//! the connections, turns each hyper request into a [`Request`], calls
//! [`Engine::dispatch`], and writes the [`Response`] back. Everything about
//! routing lives in the engine.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or **Ctrl-C** the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::engine::Engine;
use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server.
pub struct Server {
    addr: String,
}

impl Server {
    /// Configures the server to bind to `addr` (`host:port`) when
    /// [`serve`](Server::serve) is called.
    ///
    /// ```rust,no_run
    /// use sprig::{Engine, Server};
    ///
    /// # async fn run() -> Result<(), sprig::Error> {
    /// Server::bind("0.0.0.0:9999").serve(Engine::with_defaults()).await
    /// # }
    /// ```
    pub fn bind(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Starts accepting connections and dispatching them through `engine`.
    ///
    /// Returns [`Error::InvalidAddress`] if the address does not parse, and
    /// otherwise only after a full graceful shutdown.
    pub async fn serve(self, engine: Engine) -> Result<(), Error> {
        let addr: SocketAddr = self.addr.parse().map_err(|source| Error::InvalidAddress {
            addr: self.addr.clone(),
            source,
        })?;
        let listener = TcpListener::bind(addr).await?;

        // Read-only from here on; shared by every connection task.
        let engine = Arc::new(engine);

        info!(%addr, "sprig listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut shutdown => {
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

                    let engine = Arc::clone(&engine);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req: hyper::Request<Incoming>| {
                            let engine = Arc::clone(&engine);
                            async move { dispatch(&engine, req).await }
                        });

                        // `auto::Builder` serves HTTP/1.1 and HTTP/2,
                        // whichever the client negotiates.
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

        while tasks.join_next().await.is_some() {}

        info!("sprig stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Converts one hyper request, dispatches it, and converts the response back.
async fn dispatch<B>(
    engine: &Engine,
    req: hyper::Request<B>,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Display,
{
    let res = match into_request(req).await {
        Ok(request) => engine.dispatch(request).await,
        Err(rejected) => rejected,
    };
    Ok(res.into_http())
}

/// Builds a [`Request`] from the hyper request, collecting the whole body.
///
/// Failures before dispatch are answered here so hyper never sees an error:
/// a method the router has no tree for is `405`, a body that cannot be read
/// is `400`. Header values that are not plain visible ASCII are kept,
/// decoded as lossy UTF-8, rather than dropped.
async fn into_request<B>(req: hyper::Request<B>) -> Result<Request, Response>
where
    B: Body,
    B::Error: Display,
{
    let (parts, body) = req.into_parts();

    let Ok(method) = Method::try_from(&parts.method) else {
        debug!(method = %parts.method, "unsupported method");
        return Err(Response::plain(StatusCode::METHOD_NOT_ALLOWED, "405 METHOD NOT ALLOWED\n"));
    };

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(path = %parts.uri.path(), "failed to read request body: {e}");
            return Err(Response::plain(StatusCode::BAD_REQUEST, "400 BAD REQUEST\n"));
        }
    };

    let target = parts
        .uri
        .path_and_query()
        .map_or("/", |target| target.as_str());
    let mut request = Request::new(method, target).with_body(body);
    for (name, value) in &parts.headers {
        let value = match value.to_str() {
            Ok(value) => Cow::Borrowed(value),
            Err(_) => {
                debug!(header = %name, "non-ASCII header value decoded lossily");
                String::from_utf8_lossy(value.as_bytes())
            }
        };
        request = request.with_header(name.as_str(), &value);
    }
    Ok(request)
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
