use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::Result;
use mailgate::{config::get_or_init_config, web::cors::OriginPolicy, AppState, NewsletterClient};
use serde_json::Value;
use tokio::net::TcpListener;
use wiremock::MockServer;

/// Listed in `config/local.toml`, requests sent with this origin pass the
/// proxy's allow-list.
pub const ALLOWED_ORIGIN: &str = "https://blog.example.com";

pub struct TestApp {
    pub addr: SocketAddr,
    /// Stands in for the upstream newsletter provider.
    pub upstream_server: MockServer,
    pub publication_id: String,
    http_client: reqwest::Client,
}

impl TestApp {
    pub fn subscribe_url(&self) -> String {
        format!("http://{}/subscribe", self.addr)
    }

    /// The path the proxy is expected to call on the upstream provider.
    pub fn upstream_subscriptions_path(&self) -> String {
        format!("/publications/{}/subscriptions", self.publication_id)
    }

    pub async fn post_subscribe(
        &self,
        origin: Option<&str>,
        body: &Value,
    ) -> Result<reqwest::Response> {
        let mut req = self.http_client.post(self.subscribe_url()).json(body);
        if let Some(origin) = origin {
            req = req.header("Origin", origin);
        }
        Ok(req.send().await?)
    }

    pub async fn post_subscribe_raw(
        &self,
        origin: Option<&str>,
        body: &'static str,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .http_client
            .post(self.subscribe_url())
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(origin) = origin {
            req = req.header("Origin", origin);
        }
        Ok(req.send().await?)
    }

    pub async fn options_subscribe(&self, origin: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self
            .http_client
            .request(reqwest::Method::OPTIONS, self.subscribe_url());
        if let Some(origin) = origin {
            req = req.header("Origin", origin);
        }
        Ok(req.send().await?)
    }
}

/// Trying to bind port 0 will trigger an OS scan for an available port
/// which will then be bound to the application.
const TEST_SOCK_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0);

/// Spawns the app on a random port, with the upstream client pointed at a
/// fresh `MockServer` and a short timeout so transport-failure tests finish
/// quickly.
pub async fn spawn_test_app() -> Result<TestApp> {
    let config = get_or_init_config();

    let upstream_server = MockServer::start().await;
    let newsletter_client = NewsletterClient::new(
        upstream_server.uri(),
        config.upstream_config.publication_id.clone(),
        config.upstream_config.api_key.clone(),
        Duration::from_millis(200),
    )?;
    let origin_policy = OriginPolicy::parse(&config.cors_config.allowed_origins)?;
    let app_state = AppState::new(newsletter_client, origin_policy);

    let listener = TcpListener::bind(&TEST_SOCK_ADDR).await?;
    let addr = SocketAddr::from((TEST_SOCK_ADDR.ip(), listener.local_addr()?.port()));

    tokio::spawn(mailgate::serve(listener, app_state));

    Ok(TestApp {
        addr,
        upstream_server,
        publication_id: config.upstream_config.publication_id.clone(),
        http_client: reqwest::Client::new(),
    })
}
