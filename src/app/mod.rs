pub mod serve;

// re-export
pub use serve::serve;

use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{config::AppConfig, web::cors::OriginPolicy, NewsletterClient, Result};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    pub async fn build_from_config(config: &AppConfig) -> Result<Self> {
        let upstream = &config.upstream_config;

        let newsletter_client = NewsletterClient::new(
            &upstream.api_url,
            upstream.publication_id.clone(),
            upstream.api_key.clone(),
            upstream.timeout(),
        )?;
        let origin_policy = OriginPolicy::parse(&config.cors_config.allowed_origins)?;

        let app_state = AppState::new(newsletter_client, origin_policy);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub newsletter_client: NewsletterClient,
    pub origin_policy: OriginPolicy,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(newsletter_client: NewsletterClient, origin_policy: OriginPolicy) -> Self {
        AppState(Arc::new(InternalState {
            newsletter_client,
            origin_policy,
        }))
    }
}
