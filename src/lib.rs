//! # sprig
//!
//! A small HTTP router with route groups and middleware.
//!
//! - Segment-trie routing with `:name` parameters and `*name` catch-alls,
//!   one tree per method
//! - Route groups with nested prefixes, each carrying its own middleware
//! - Onion-style middleware driven by [`Context::next`] and [`Context::fail`]
//! - Static files, request logging and panic recovery out of the box
//! - A hyper-based [`Server`] with graceful shutdown
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use sprig::{BoxFuture, Context, Engine, Server};
//!
//! fn hello(c: &mut Context) -> BoxFuture<'_> {
//!     Box::pin(async move {
//!         let name = c.param("name").unwrap_or("stranger").to_owned();
//!         c.string(StatusCode::OK, format!("hello {name}\n"));
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sprig::Error> {
//!     let mut app = Engine::with_defaults();
//!     app.get("/hello/:name", hello)
//!         .static_files("/assets", "./static");
//!
//!     let mut v2 = app.group("/v2");
//!     v2.get("/ping", |c| Box::pin(async move { c.string(StatusCode::OK, "pong") }));
//!
//!     Server::bind("0.0.0.0:9999").serve(app).await
//! }
//! ```
//!
//! Every handler and middleware has the same shape: it borrows the
//! [`Context`] for the length of the returned future. The engine can also be
//! driven without a socket, which is how the tests exercise it:
//!
//! ```rust
//! use http::StatusCode;
//! use sprig::{Engine, Method, Request};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut app = Engine::new();
//! app.get("/", |c| Box::pin(async move { c.html(StatusCode::OK, "<h1>Hello</h1>") }));
//!
//! let res = app.dispatch(Request::new(Method::Get, "/")).await;
//! assert_eq!(res.status(), StatusCode::OK);
//! assert_eq!(res.text(), "<h1>Hello</h1>");
//! # });
//! ```

mod context;
mod engine;
mod error;
mod group;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod static_files;
mod trie;

pub mod middleware;

pub use context::Context;
pub use engine::Engine;
pub use error::Error;
pub use group::RouterGroup;
pub use handler::BoxFuture;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, Response};
pub use server::Server;
