//! A small CORS-enforcing proxy that accepts newsletter signups from the
//! website and forwards them to the upstream provider, keeping the provider's
//! API key server-side. Also ships a headless form client mirroring the
//! browser-side submission flow.

pub mod app;
pub mod config;
pub mod form;
pub mod newsletter_client;
pub mod web;

mod error;

// re-exports
pub use app::{serve, App, AppState};
pub use error::{Error, Result};
pub use newsletter_client::NewsletterClient;

use tracing_subscriber::EnvFilter;

/// Production tracing: compact single-line output, `info` unless overridden
/// through `RUST_LOG`.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();
}

pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .without_time()
        .pretty()
        .init();
}
