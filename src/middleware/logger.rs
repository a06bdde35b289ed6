use std::time::Instant;

use tracing::info;

use crate::context::Context;
use crate::handler::BoxFuture;

/// Times the rest of the chain and logs method, path, status and latency.
pub fn logger(c: &mut Context) -> BoxFuture<'_> {
    Box::pin(async move {
        let started = Instant::now();
        c.next().await;
        info!(
            method = %c.method(),
            path = %c.path(),
            status = c.status_code().as_u16(),
            elapsed = ?started.elapsed(),
            "request"
        );
    })
}
