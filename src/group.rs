//! Route groups.
//!
//! A group is a path prefix plus an ordered list of middleware. Groups nest:
//! a child's prefix is its parent's prefix followed by its own. Middleware is
//! not copied into children; at dispatch time every group whose prefix
//! matches the request path contributes its middleware, which is how a
//! child inherits its parent's.
//!
//! [`RouterGroup`] is a short-lived handle borrowing the [`Engine`] while
//! routes are being registered:
//!
//! ```rust
//! use sprig::{BoxFuture, Context, Engine};
//! use http::StatusCode;
//!
//! fn only_admins(c: &mut Context) -> BoxFuture<'_> {
//!     Box::pin(async move {
//!         if c.header("x-role") != Some("admin") {
//!             c.fail(StatusCode::FORBIDDEN, "admins only");
//!             return;
//!         }
//!         c.next().await;
//!     })
//! }
//!
//! let mut app = Engine::new();
//! let mut v2 = app.group("/v2");
//! v2.get("/status", |c| Box::pin(async move { c.string(StatusCode::OK, "up") }));
//!
//! let mut admin = v2.group("/admin");
//! admin
//!     .add_middleware(only_admins)
//!     .post("/reload", |c| Box::pin(async move { c.status(StatusCode::ACCEPTED) }));
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::context::Context;
use crate::engine::Engine;
use crate::error::Error;
use crate::handler::{BoxFuture, boxed};
use crate::method::Method;
use crate::static_files;

pub struct RouterGroup<'e> {
    engine: &'e mut Engine,
    index: usize,
}

impl<'e> RouterGroup<'e> {
    pub(crate) fn new(engine: &'e mut Engine, index: usize) -> Self {
        Self { engine, index }
    }

    /// The full prefix: every ancestor's prefix followed by this group's own.
    pub fn prefix(&self) -> &str {
        &self.engine.groups[self.index].prefix
    }

    /// Creates a nested group under this one.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let index = self.engine.push_group(self.index, prefix);
        RouterGroup::new(self.engine, index)
    }

    /// Appends a middleware; calls accumulate in execution order.
    pub fn add_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.engine.groups[self.index].middlewares.push(boxed(middleware));
        self
    }

    /// Registers `handler` at this group's prefix followed by `path`.
    ///
    /// # Panics
    ///
    /// Panics if the resulting pattern is invalid: a `*` segment that is not
    /// last, or a `:`/`*` segment without a name.
    pub fn route<F>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.try_route(method, path, handler)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_route<F>(&mut self, method: Method, path: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        let pattern = format!("{}{}", self.prefix(), path);
        self.engine.router.add_route(method, &pattern, boxed(handler))?;
        Ok(self)
    }

    pub fn get<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.route(Method::Get, path, handler)
    }

    pub fn post<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.route(Method::Post, path, handler)
    }

    pub fn put<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.route(Method::Put, path, handler)
    }

    pub fn patch<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.route(Method::Patch, path, handler)
    }

    pub fn delete<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.route(Method::Delete, path, handler)
    }

    /// Serves the files under `root` at `relative_path/*filepath`.
    ///
    /// `app.static_files("/assets", "./static")` answers
    /// `GET /assets/css/a.css` with `./static/css/a.css`. Missing files and
    /// paths escaping `root` answer `404`.
    pub fn static_files(&mut self, relative_path: &str, root: impl Into<PathBuf>) -> &mut Self {
        let root = Arc::new(root.into());
        let pattern = format!("{}/*filepath", relative_path.trim_end_matches('/'));
        self.get(&pattern, move |c| {
            let root = Arc::clone(&root);
            Box::pin(async move { static_files::serve(c, &root).await })
        })
    }
}
