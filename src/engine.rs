//! The top-level engine: route table, group list, per-request dispatch.

use std::path::PathBuf;

use tracing::debug;

use crate::context::Context;
use crate::error::Error;
use crate::group::RouterGroup;
use crate::handler::{BoxFuture, BoxedHandler};
use crate::method::Method;
use crate::middleware;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// One route group as seen by the dispatcher: a fixed prefix and the
/// middleware registered on it, in registration order.
pub(crate) struct GroupEntry {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<BoxedHandler>,
}

/// The application.
///
/// Owns the router and every route group. The engine itself registers
/// through its default group (empty prefix), so everything a
/// [`RouterGroup`] can do is available here too.
///
/// ```rust
/// use sprig::{BoxFuture, Context, Engine};
/// use http::StatusCode;
///
/// fn hello(c: &mut Context) -> BoxFuture<'_> {
///     Box::pin(async move {
///         let name = c.param("name").unwrap_or_default().to_owned();
///         c.string(StatusCode::OK, format!("hello {name}\n"));
///     })
/// }
///
/// let mut app = Engine::with_defaults();
/// app.get("/hello/:name", hello);
///
/// let mut v2 = app.group("/v2");
/// v2.get("/hello/:name", hello);
/// ```
///
/// Build it once, then hand it to [`Server::serve`](crate::Server::serve) or
/// call [`Engine::dispatch`] directly. Dispatch takes `&self`: after startup
/// the route table is never mutated.
pub struct Engine {
    pub(crate) router: Router,
    // Creation order; index 0 is the default group.
    pub(crate) groups: Vec<GroupEntry>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![GroupEntry { prefix: String::new(), middlewares: Vec::new() }],
        }
    }

    /// An engine with [`middleware::logger`] and [`middleware::recovery`]
    /// installed globally, in that order.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine
            .add_middleware(middleware::logger)
            .add_middleware(middleware::recovery);
        engine
    }

    pub(crate) fn root(&mut self) -> RouterGroup<'_> {
        RouterGroup::new(self, 0)
    }

    /// Appends a group whose prefix is `parent`'s prefix followed by `suffix`.
    pub(crate) fn push_group(&mut self, parent: usize, suffix: &str) -> usize {
        let prefix = format!("{}{}", self.groups[parent].prefix, suffix);
        self.groups.push(GroupEntry { prefix, middlewares: Vec::new() });
        self.groups.len() - 1
    }

    /// Creates a top-level route group.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let index = self.push_group(0, prefix);
        RouterGroup::new(self, index)
    }

    /// Adds middleware that runs for every matched request.
    pub fn add_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.root().add_middleware(middleware);
        self
    }

    /// Registers a route.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern; see [`Engine::try_route`].
    pub fn route<F>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.root().route(method, path, handler);
        self
    }

    /// Registers a route, returning [`Error::InvalidPattern`] instead of
    /// panicking.
    pub fn try_route<F>(&mut self, method: Method, path: &str, handler: F) -> Result<&mut Self, Error>
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        self.root().try_route(method, path, handler)?;
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

    /// Serves files under `root` at `relative_path/*filepath`.
    pub fn static_files(&mut self, relative_path: &str, root: impl Into<PathBuf>) -> &mut Self {
        self.root().static_files(relative_path, root);
        self
    }

    /// Routes one request through the matching middleware and handler.
    ///
    /// Middleware of every group whose prefix is a literal prefix of the
    /// request path runs first, groups in creation order and each group's
    /// middleware in registration order. Unmatched requests are answered
    /// `404` without running any middleware.
    pub async fn dispatch(&self, request: Request) -> Response {
        let chain = self.middlewares_for(request.path());
        debug!(
            method = %request.method(),
            path = %request.path(),
            middlewares = chain.len(),
            "dispatch"
        );

        let mut c = Context::new(request, chain);
        self.router.handle(&mut c).await;
        c.into_response()
    }

    fn middlewares_for(&self, path: &str) -> Vec<BoxedHandler> {
        self.groups
            .iter()
            .filter(|group| path.starts_with(group.prefix.as_str()))
            .flat_map(|group| group.middlewares.iter().cloned())
            .collect()
    }
}

impl Default for Engine {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::StatusCode;

    use super::*;

    type Trace = Arc<Mutex<Vec<&'static str>>>;

    /// Adds a middleware to `group` that records `name`, then continues.
    fn mark(group: &mut RouterGroup<'_>, trace: &Trace, name: &'static str) {
        let trace = Arc::clone(trace);
        group.add_middleware(move |c| {
            let trace = Arc::clone(&trace);
            Box::pin(async move {
                trace.lock().unwrap().push(name);
                c.next().await;
            })
        });
    }

    /// Registers a GET handler on `group` that records `name` and answers 200.
    fn endpoint(group: &mut RouterGroup<'_>, path: &str, trace: &Trace, name: &'static str) {
        let trace = Arc::clone(trace);
        group.get(path, move |c| {
            let trace = Arc::clone(&trace);
            Box::pin(async move {
                trace.lock().unwrap().push(name);
                c.string(StatusCode::OK, name);
            })
        });
    }

    fn get(path: &str) -> Request {
        Request::new(Method::Get, path)
    }

    #[tokio::test]
    async fn group_middleware_runs_before_handler() {
        let trace = Trace::default();
        let mut engine = Engine::new();
        let mut v2 = engine.group("/v2");
        mark(&mut v2, &trace, "M");
        endpoint(&mut v2, "/hello/:name", &trace, "handler");

        let res = engine.dispatch(get("/v2/hello/x")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*trace.lock().unwrap(), vec!["M", "handler"]);
    }

    #[tokio::test]
    async fn nested_groups_run_outer_middleware_first() {
        let trace = Trace::default();
        let mut engine = Engine::new();
        mark(&mut engine.root(), &trace, "global");
        let mut v2 = engine.group("/v2");
        mark(&mut v2, &trace, "A1");
        mark(&mut v2, &trace, "A2");
        let mut admin = v2.group("/admin");
        assert_eq!(admin.prefix(), "/v2/admin");
        mark(&mut admin, &trace, "B1");
        mark(&mut admin, &trace, "B2");
        endpoint(&mut admin, "/x", &trace, "handler");

        engine.dispatch(get("/v2/admin/x")).await;
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["global", "A1", "A2", "B1", "B2", "handler"]
        );
    }

    #[tokio::test]
    async fn sibling_group_middleware_does_not_apply() {
        let trace = Trace::default();
        let mut engine = Engine::new();
        let mut v1 = engine.group("/v1");
        mark(&mut v1, &trace, "v1");
        let mut v2 = engine.group("/v2");
        mark(&mut v2, &trace, "v2");
        endpoint(&mut v2, "/ping", &trace, "handler");

        engine.dispatch(get("/v2/ping")).await;
        assert_eq!(*trace.lock().unwrap(), vec!["v2", "handler"]);
    }

    #[tokio::test]
    async fn group_prefix_matching_is_literal() {
        let trace = Trace::default();
        let mut engine = Engine::new();
        let mut v2 = engine.group("/v2");
        mark(&mut v2, &trace, "v2");
        endpoint(&mut engine.root(), "/v2beta/ping", &trace, "handler");

        engine.dispatch(get("/v2beta/ping")).await;
        assert_eq!(*trace.lock().unwrap(), vec!["v2", "handler"]);
    }

    #[tokio::test]
    async fn fail_prevents_handler_and_sets_status() {
        let trace = Trace::default();
        let mut engine = Engine::new();
        let mut admin = engine.group("/admin");
        admin.add_middleware(|c| {
            Box::pin(async move {
                if c.header("authorization").is_none() {
                    c.fail(StatusCode::UNAUTHORIZED, "unauthorized");
                }
                c.next().await;
            })
        });
        mark(&mut admin, &trace, "after-auth");
        endpoint(&mut admin, "/panel", &trace, "handler");

        let res = engine.dispatch(get("/admin/panel")).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.text(), r#"{"message":"unauthorized"}"#);
        assert!(trace.lock().unwrap().is_empty());

        let authorized = get("/admin/panel").with_header("Authorization", "Bearer t");
        let res = engine.dispatch(authorized).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*trace.lock().unwrap(), vec!["after-auth", "handler"]);
    }

    #[tokio::test]
    async fn unmatched_request_skips_middleware() {
        let trace = Trace::default();
        let mut engine = Engine::new();
        mark(&mut engine.root(), &trace, "global");

        let res = engine.dispatch(get("/unregistered")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.text().contains("/unregistered"));
        assert!(trace.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn re_registration_replaces_handler() {
        let mut engine = Engine::new();
        engine.get("/v", |c| Box::pin(async move { c.string(StatusCode::OK, "old") }));
        engine.get("/v", |c| Box::pin(async move { c.string(StatusCode::OK, "new") }));

        let res = engine.dispatch(get("/v")).await;
        assert_eq!(res.text(), "new");
    }

    #[tokio::test]
    async fn verbs_register_on_their_own_method() {
        let mut engine = Engine::new();
        engine
            .post("/items", |c| Box::pin(async move { c.status(StatusCode::CREATED) }))
            .delete("/items/:id", |c| Box::pin(async move { c.status(StatusCode::NO_CONTENT) }));

        let created = engine.dispatch(Request::new(Method::Post, "/items")).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let deleted = engine.dispatch(Request::new(Method::Delete, "/items/3")).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        let missing = engine.dispatch(get("/items")).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn with_defaults_installs_logger_and_recovery() {
        let engine = Engine::with_defaults();
        assert_eq!(engine.groups.len(), 1);
        assert_eq!(engine.groups[0].middlewares.len(), 2);
    }

    #[test]
    fn try_route_reports_invalid_patterns() {
        let mut engine = Engine::new();
        let result = engine.try_route(Method::Get, "/*path/more", |c| {
            Box::pin(async move { c.status(StatusCode::OK) })
        });
        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    #[should_panic(expected = "catch-all segment must be the last segment")]
    fn route_panics_on_invalid_pattern() {
        let mut engine = Engine::new();
        engine.get("/files/*path/edit", |c| Box::pin(async move { c.status(StatusCode::OK) }));
    }
}
