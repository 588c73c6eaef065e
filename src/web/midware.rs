use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    web::{cors, log, Error, REQUEST_ID_HEADER},
    AppState,
};

/// Maps a `web::Error` stashed in the response extensions into the flat
/// client-facing JSON body, and emits the per-request logline.
pub async fn response_mapper(
    req_method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    resp: Response,
) -> Response {
    let uuid = req_headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(Uuid::new_v4);

    let web_error = resp.extensions().get::<Arc<Error>>().map(|er| er.as_ref());
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let client_error_body = json!({
            "error": cl_err.to_string(),
        });

        (*status, Json(client_error_body)).into_response()
    });

    let _ = log::log_request(
        uuid,
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error,
    )
    .await;

    err_resp.unwrap_or(resp)
}

/// Attaches the CORS header set to every response, derived from the request's
/// `Origin` header and the configured allow-list. Runs outside the response
/// mapper so mapped error responses carry the headers too.
pub async fn attach_cors_headers(
    State(app_state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut resp = next.run(req).await;

    let headers = cors::cors_headers(origin.as_deref(), &app_state.origin_policy);
    resp.headers_mut().extend(headers);

    resp
}
