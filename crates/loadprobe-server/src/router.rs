//! Axum router wiring.
//!
//! Routing by path happens in the dispatcher's route table, so axum only
//! needs a single fallback that forwards everything.

use axum::Router;

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(transport::http::serve)
        .with_state(state)
}
