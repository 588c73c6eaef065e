use anyhow::Result;
use reqwest::StatusCode;

use crate::helpers::{spawn_test_app, ALLOWED_ORIGIN};

#[tokio::test]
async fn preflight_with_allowed_origin_gets_allow_origin_header() -> Result<()> {
    let app = spawn_test_app().await?;

    let res = app.options_subscribe(Some(ALLOWED_ORIGIN)).await?;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let headers = res.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some(ALLOWED_ORIGIN)
    );
    assert_eq!(
        headers
            .get("access-control-allow-methods")
            .and_then(|v| v.to_str().ok()),
        Some("POST, OPTIONS")
    );
    assert_eq!(
        headers
            .get("access-control-allow-headers")
            .and_then(|v| v.to_str().ok()),
        Some("Content-Type")
    );
    assert_eq!(
        headers
            .get("access-control-max-age")
            .and_then(|v| v.to_str().ok()),
        Some("86400")
    );

    Ok(())
}

#[tokio::test]
async fn preflight_with_wildcard_matched_origin_gets_allow_origin_header() -> Result<()> {
    let app = spawn_test_app().await?;

    // "https://*.example.dev" is on the local allow-list.
    let res = app.options_subscribe(Some("https://docs.example.dev")).await?;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://docs.example.dev")
    );

    Ok(())
}

#[tokio::test]
async fn preflight_with_disallowed_origin_is_204_without_allow_origin() -> Result<()> {
    let app = spawn_test_app().await?;

    for origin in [Some("https://evil.example.net"), None] {
        let res = app.options_subscribe(origin).await?;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let headers = res.headers();
        // The browser blocks the real request on its own when this is absent.
        assert!(headers.get("access-control-allow-origin").is_none());
        assert!(headers.get("access-control-allow-methods").is_some());
        assert!(headers.get("access-control-max-age").is_some());
    }

    Ok(())
}
