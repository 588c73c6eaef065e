use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use tracing::info;

use crate::{
    web::{
        data::{ApiResponse, DeserSubscription, ValidSubscription},
        Error, WebResult,
    },
    AppState,
};

/// CORS preflight. Always 204; the header set (allow-origin included only
/// for allowed origins) is attached by the CORS middleware.
pub async fn subscribe_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Proxies a subscription request to the upstream newsletter provider.
///
/// The origin check runs first so a disallowed caller never triggers an
/// upstream call. The body is read raw and parsed here instead of through the
/// `Json` extractor, so a malformed body produces our own 400 response shape.
#[tracing::instrument(name = "Proxying a subscription upstream", skip(app_state, headers, body))]
pub async fn api_subscribe(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebResult<Json<ApiResponse>> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());
    if !app_state.origin_policy.is_allowed(origin) {
        return Err(Error::OriginRejected);
    }

    let deser_sub: DeserSubscription =
        serde_json::from_slice(&body).map_err(|e| Error::InvalidJson(e.to_string()))?;
    let subscription = ValidSubscription::try_from(deser_sub)?;

    app_state
        .newsletter_client
        .create_subscription(&subscription)
        .await?;

    info!("New subscriber successfully proxied upstream.");

    Ok(Json(ApiResponse::subscribed()))
}
