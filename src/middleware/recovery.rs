use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use http::StatusCode;
use tracing::error;

use crate::context::Context;
use crate::handler::BoxFuture;

/// Runs the rest of the chain and converts a panic into `500`.
///
/// Install it before anything that might panic: only steps that run inside
/// its `next()` are covered. The chain does not resume past the panicking
/// step; the response becomes `{"message": "Internal Server Error"}` and
/// headers written before the panic are discarded.
pub fn recovery(c: &mut Context) -> BoxFuture<'_> {
    Box::pin(async move {
        let outcome = AssertUnwindSafe(c.next()).catch_unwind().await;
        if let Err(payload) = outcome {
            error!(
                method = %c.method(),
                path = %c.path(),
                panic = panic_message(payload.as_ref()),
                "recovered from panic"
            );
            c.clear_headers();
            c.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
