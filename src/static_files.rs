//! Static file serving behind a `*filepath` route.

use std::path::{Path, PathBuf};

use http::StatusCode;
use tracing::debug;

use crate::context::Context;
use crate::response::ContentType;

/// Answers with the file named by the `filepath` parameter under `root`.
///
/// Directories are served through their `index.html`. Anything that cannot
/// be read answers `404` with an empty body.
pub(crate) async fn serve(c: &mut Context, root: &Path) {
    let Some(mut path) = resolve(root, c.param("filepath").unwrap_or_default()) else {
        debug!(path = %c.path(), "static path rejected");
        c.status(StatusCode::NOT_FOUND);
        return;
    };

    if tokio::fs::metadata(&path).await.is_ok_and(|meta| meta.is_dir()) {
        path.push("index.html");
    }

    match tokio::fs::read(&path).await {
        Ok(contents) => c.bytes(StatusCode::OK, ContentType::from_path(&path), contents),
        Err(e) => {
            debug!(file = %path.display(), error = %e, "static file unavailable");
            c.status(StatusCode::NOT_FOUND);
        }
    }
}

/// Joins the `/`-separated `file` onto `root`, refusing any component that
/// could step outside it. `file` is already percent-decoded, so `%2e%2e`
/// arrives here as `..`.
fn resolve(root: &Path, file: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in file.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if segment == ".." || segment.contains(['\\', ':', '\0']) {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}
