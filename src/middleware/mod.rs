//! Standard middleware.
//!
//! A middleware is any step with the handler shape,
//! `fn(&mut Context) -> BoxFuture<'_>`, registered with `add_middleware` on
//! the engine or a group. It decides whether the request goes on by awaiting
//! [`Context::next`](crate::Context::next); code after that await runs once
//! the rest of the chain has finished.
//!
//! - [`logger`]: one `tracing` event per request with status and latency
//! - [`recovery`]: turns a panic further down the chain into a `500`
//!
//! [`Engine::with_defaults`](crate::Engine::with_defaults) installs both.

mod logger;
mod recovery;

pub use logger::logger;
pub use recovery::recovery;
