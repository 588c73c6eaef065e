use axum::middleware;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    web::{midware, routes},
    AppState,
};

pub type ServeResult<T> = core::result::Result<T, ServeError>;

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// SERVE
/// The core function serving this application. Builds the App `Router` from
/// the provided `AppState` and serves it on the provided `TcpListener`.
/// Needs to be awaited like so:
/// ```ignore
/// mailgate::serve(listener, app_state).await;
/// ```
pub async fn serve(listener: TcpListener, app_state: AppState) -> ServeResult<()> {
    // Layer ordering matters: the response mapper has to run before the CORS
    // middleware on the response path, so that mapped error responses still
    // get their CORS headers attached.
    let app = routes::routes(app_state.clone()).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(middleware::from_fn_with_state(
                app_state,
                midware::attach_cors_headers,
            ))
            .layer(middleware::map_response(midware::response_mapper)),
    );

    axum::serve(listener, app).await?;

    Ok(())
}
