//! Trie-backed request router.
//!
//! One segment trie per HTTP method, plus a handler table keyed by method
//! and canonical pattern. Built once at startup through sequential
//! registration; read-only (and freely shared across threads) afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use tracing::{info, warn};

use crate::context::Context;
use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::trie::{self, Node};

/// Path parameters bound by a match, keyed by name without the sigil.
pub(crate) type Params = HashMap<String, String>;

#[derive(Default)]
pub(crate) struct Router {
    roots: HashMap<Method, Node>,
    handlers: HashMap<Method, HashMap<String, BoxedHandler>>,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` + `pattern`.
    ///
    /// Registering the same pattern again replaces the handler. A pattern
    /// that differs only in parameter names (`/a/:x` then `/a/:y`) replaces
    /// the older route entirely.
    pub(crate) fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        let segments = trie::parse_pattern(pattern)?;
        let pattern = trie::canonical(&segments);

        let handlers = self.handlers.entry(method).or_default();
        let displaced = self
            .roots
            .entry(method)
            .or_default()
            .insert(&pattern, &segments, 0);
        if let Some(displaced) = displaced {
            warn!(%method, old = %displaced, new = %pattern, "route replaced by an equivalent pattern");
            handlers.remove(&displaced);
        }

        info!(%method, %pattern, "route registered");
        handlers.insert(pattern, handler);
        Ok(())
    }

    /// Resolves `path` to the matched node and its bound parameters.
    pub(crate) fn get_route(&self, method: Method, path: &str) -> Option<(&Node, Params)> {
        let root = self.roots.get(&method)?;
        let segments = trie::split_segments(path);
        let node = root.search(&segments, 0)?;
        let params = extract_params(node.pattern(), &segments);
        Some((node, params))
    }

    /// Resolves `path` all the way to the registered handler.
    pub(crate) fn lookup(&self, method: Method, path: &str) -> Option<(BoxedHandler, Params)> {
        let (node, params) = self.get_route(method, path)?;
        let handler = self.handlers.get(&method)?.get(node.pattern())?;
        Some((Arc::clone(handler), params))
    }

    /// Appends the matched handler to the context's chain and starts it.
    ///
    /// An unmatched request is answered with `404` directly; none of the
    /// chain runs.
    pub(crate) async fn handle(&self, c: &mut Context) {
        match self.lookup(c.method(), c.path()) {
            Some((handler, params)) => {
                c.set_params(params);
                c.push(handler);
                c.next().await;
            }
            None => {
                let body = format!("404 NOT FOUND: {}\n", c.path());
                c.string(StatusCode::NOT_FOUND, body);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn route_count(&self) -> usize {
        self.handlers.values().map(HashMap::len).sum()
    }
}

/// Binds the `:` and `*` segments of the winning `pattern` to the request
/// segments at the same positions. A catch-all takes the remaining segments
/// joined by `/`, possibly none.
fn extract_params(pattern: &str, segments: &[&str]) -> Params {
    let mut params = Params::new();
    for (index, part) in trie::split_segments(pattern).into_iter().enumerate() {
        if let Some(name) = part.strip_prefix(':') {
            if let Some(value) = segments.get(index) {
                params.insert(name.to_owned(), (*value).to_owned());
            }
        } else if let Some(name) = part.strip_prefix('*') {
            let rest = segments.get(index..).unwrap_or_default();
            params.insert(name.to_owned(), rest.join("/"));
            break;
        }
    }
    params
}
