//! Minimal sprig example: parameters, groups, middleware, static files.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:9999/
//!   curl http://localhost:9999/hello/geektutu
//!   curl 'http://localhost:9999/search?q=sprig'
//!   curl -X POST http://localhost:9999/login -d 'username=alice&password=x'
//!   curl http://localhost:9999/v2/hello/geektutu
//!   curl -H 'authorization: Bearer t' http://localhost:9999/v2/hello/geektutu
//!   curl http://localhost:9999/panic
//!   curl http://localhost:9999/assets/index.html
//!
//! The listen address defaults to `0.0.0.0:9999`; set `SPRIG_ADDR` to
//! override it.

use http::StatusCode;
use serde_json::json;
use sprig::{BoxFuture, Context, Engine, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), sprig::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut app = Engine::with_defaults();
    app.get("/", index)
        .get("/hello/:name", hello)
        .get("/search", search)
        .post("/login", login)
        .get("/panic", panic_route)
        .static_files("/assets", "./static");

    let mut v2 = app.group("/v2");
    v2.add_middleware(require_token)
        .get("/hello/:name", hello);

    let addr = std::env::var("SPRIG_ADDR").unwrap_or_else(|_| "0.0.0.0:9999".to_owned());
    Server::bind(addr).serve(app).await
}

// GET /
fn index(c: &mut Context) -> BoxFuture<'_> {
    Box::pin(async move { c.html(StatusCode::OK, "<h1>Hello sprig</h1>") })
}

// GET /hello/:name
fn hello(c: &mut Context) -> BoxFuture<'_> {
    Box::pin(async move {
        let name = c.param("name").unwrap_or_default().to_owned();
        let path = c.path().to_owned();
        c.string(StatusCode::OK, format!("hello {name}, you're at {path}\n"));
    })
}

// GET /search?q=...
fn search(c: &mut Context) -> BoxFuture<'_> {
    Box::pin(async move {
        let q = c.query("q").unwrap_or_default();
        c.json(StatusCode::OK, &json!({ "query": q }));
    })
}

// POST /login with an urlencoded body
fn login(c: &mut Context) -> BoxFuture<'_> {
    Box::pin(async move {
        let Some(username) = c.post_form("username") else {
            c.fail(StatusCode::BAD_REQUEST, "username is required");
            return;
        };
        c.json(StatusCode::OK, &json!({ "username": username }));
    })
}

// GET /panic: recovery answers 500 and the server keeps going.
fn panic_route(c: &mut Context) -> BoxFuture<'_> {
    Box::pin(async move {
        let names = ["geektutu"];
        let index = c.path().len();
        c.string(StatusCode::OK, names[index]);
    })
}

fn require_token(c: &mut Context) -> BoxFuture<'_> {
    Box::pin(async move {
        if c.header("authorization").is_none() {
            c.fail(StatusCode::UNAUTHORIZED, "missing authorization header");
            return;
        }
        c.next().await;
    })
}
