use crate::{app, config, form, newsletter_client, web};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("web error: {0}")]
    Web(#[from] web::Error),
    #[error("newsletter client error: {0}")]
    NewsletterClient(#[from] newsletter_client::Error),
    #[error("form error: {0}")]
    Form(#[from] form::FormError),
    #[error("origin pattern error: {0}")]
    OriginPattern(#[from] web::cors::InvalidOriginPattern),
    #[error("serving error: {0}")]
    Serve(#[from] app::serve::ServeError),

    #[error("tokio joining error: {0}")]
    TokioJoin(#[from] tokio::task::JoinError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
