//! Local stand-in for the chat completions endpoint, used by tests.

use axum::{http::StatusCode, routing::post, Router};

pub const PATH: &str = "/openai/v1/chat/completions";

/// Serves `router` on an ephemeral localhost port and returns the endpoint URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}{PATH}")
}

/// Endpoint that always answers with the given status and body.
pub async fn respond_with(status: u16, body: &'static str) -> String {
    let status = StatusCode::from_u16(status).unwrap();
    spawn(Router::new().route(PATH, post(move || async move { (status, body) }))).await
}

/// Endpoint that answers every call with a successful completion of `content`.
pub async fn completing(content: &str) -> String {
    let body = serde_json::json!({ "choices": [{ "message": { "content": content } }] }).to_string();
    spawn(Router::new().route(
        PATH,
        post(move || {
            let body = body.clone();
            async move { (StatusCode::OK, body) }
        }),
    ))
    .await
}
