//! Contains all the routes that this application can handle.

mod subscribe;

pub use subscribe::{api_subscribe, subscribe_preflight};

use axum::{http::StatusCode, routing::post, Router};

use crate::AppState;

/// All the routes of the server. The proxy only ever answers on
/// "/subscribe"; everything else is a plain-text 404, and other methods on
/// the subscribe path get a plain-text 405.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/subscribe",
            post(api_subscribe)
                .options(subscribe_preflight)
                .fallback(method_not_allowed),
        )
        .with_state(app_state)
        .fallback(not_found)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
