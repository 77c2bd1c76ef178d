//! HTTP entry point: every request, any path or method, goes through here.

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use loadprobe_core::Reply;

use crate::app_state::AppState;

/// Routes and labels on the full request target, query string included, so
/// `/healthz?x=1` is a different path from `/healthz`.
pub async fn serve(State(app): State<AppState>, method: Method, uri: Uri) -> Response {
    let target = request_target(&uri).to_string();
    let reply = app
        .dispatcher()
        .spawn_dispatch(method.as_str().to_string(), target)
        .await;
    into_response(reply)
}

pub fn request_target(uri: &Uri) -> &str {
    uri.path_and_query().map(|p| p.as_str()).unwrap_or_else(|| uri.path())
}

/// Status line, `Content-Type`, `Content-Length`, body.
pub fn into_response(reply: Reply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, reply.content_type)
        .header(header::CONTENT_LENGTH, reply.content_length())
        .body(Body::from(reply.body))
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "response build failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}
