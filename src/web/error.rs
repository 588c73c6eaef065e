use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use crate::newsletter_client;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("request origin is not allowed")]
    OriginRejected,
    #[error("request body is not valid json: {0}")]
    InvalidJson(String),

    #[error("data parsing error: {0}")]
    DataParsing(#[from] super::data::DataParsingError),

    #[error("newsletter client error: {0}")]
    NewsletterClient(#[from] newsletter_client::Error),

    #[error("error awaiting a tokio task: {0}")]
    TokioJoin(#[from] tokio::task::JoinError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::OriginRejected => (StatusCode::FORBIDDEN, OriginNotAllowed),
            Error::InvalidJson(_) => (StatusCode::BAD_REQUEST, InvalidJsonBody),
            Error::DataParsing(_) => (StatusCode::BAD_REQUEST, InvalidEmail),
            Error::NewsletterClient(newsletter_client::Error::UpstreamRejected {
                status,
                message,
            }) => {
                // Relay the upstream's own status code with its message.
                let status =
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = message
                    .clone()
                    .unwrap_or_else(|| "Subscription failed".to_string());
                (status, UpstreamRejected(message))
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// The client-facing rendition of a failure. Rendered into the flat
/// `{"error": "..."}` body by the response mapper.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Origin not allowed")]
    OriginNotAllowed,
    #[display("Invalid JSON body")]
    InvalidJsonBody,
    #[display("Invalid email address")]
    InvalidEmail,
    #[display("{_0}")]
    UpstreamRejected(String),
    #[display("An error occurred. Please try again.")]
    ServiceError,
}
