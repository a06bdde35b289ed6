//! Handler type and type erasure.
//!
//! # One shape for handlers and middleware
//!
//! A route handler and a middleware are the same thing: an async step that
//! borrows the request [`Context`] for the duration of its future. The chain
//! for one request is a plain `Vec` of such steps, so the router needs to
//! hold steps of *different* concrete types uniformly. We erase them behind
//! `Arc<dyn Fn>`:
//!
//! ```text
//! fn hello(c: &mut Context) -> BoxFuture<'_> { … }   ← user writes this
//!        ↓ app.get("/hello/:name", hello)
//! Arc::new(hello)                                    ← BoxedHandler
//!        ↓ cloned into the per-request chain
//! step(&mut ctx).await                               ← one vtable dispatch
//! ```
//!
//! Rust cannot yet name "a future that borrows its argument" for a generic
//! `Fn`, so steps return the boxed future themselves:
//!
//! ```rust
//! use sprig::{BoxFuture, Context};
//! use http::StatusCode;
//!
//! fn hello(c: &mut Context) -> BoxFuture<'_> {
//!     Box::pin(async move {
//!         let name = c.param("name").unwrap_or("stranger").to_owned();
//!         c.string(StatusCode::OK, format!("hello {name}\n"));
//!     })
//! }
//! ```
//!
//! Closures passed straight to a registration method infer the same shape:
//! `app.get("/", |c| Box::pin(async move { c.html(StatusCode::OK, "<h1>hi</h1>") }))`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

/// A heap-allocated, type-erased future borrowing the request context.
///
/// `Send` lets the hosting server move the request future across tokio
/// worker threads.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// A type-erased step shared across concurrent requests.
///
/// Registered once at startup; every request clones the `Arc` into its own
/// chain.
pub(crate) type BoxedHandler =
    Arc<dyn for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static>;

pub(crate) fn boxed<F>(handler: F) -> BoxedHandler
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
{
    Arc::new(handler)
}
