use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::{
    matchers::{any, header_exists, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{spawn_test_app, ALLOWED_ORIGIN};

#[tokio::test]
async fn subscribe_ok() -> Result<()> {
    let app = spawn_test_app().await?;

    Mock::given(path(app.upstream_subscriptions_path()))
        .and(method("POST"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "sub_123", "status": "active" }
        })))
        .expect(1)
        .mount(&app.upstream_server)
        .await;

    let res = app
        .post_subscribe(
            Some(ALLOWED_ORIGIN),
            &json!({ "email": "jane@example.com" }),
        )
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some(ALLOWED_ORIGIN)
    );

    let body: Value = res.json().await?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Successfully subscribed!"));

    Ok(())
}

/// Matches the outbound payload for a request that carried a campaign label
/// but no page_url and no lead_magnet.
struct CampaignOnlyPayload;

impl wiremock::Match for CampaignOnlyPayload {
    fn matches(&self, request: &wiremock::Request) -> bool {
        let res: core::result::Result<Value, _> = serde_json::from_slice(&request.body);
        if let Ok(body) = res {
            body["email"] == json!("jane@example.com")
                && body["reactivate_existing"] == json!(false)
                && body["send_welcome_email"] == json!(true)
                && body["utm_source"] == json!("website")
                && body["utm_medium"] == json!("subscribe_form")
                && body["utm_campaign"] == json!("spring")
                && body.get("referring_site").is_none()
                && body.get("custom_fields").is_none()
        } else {
            false
        }
    }
}

#[tokio::test]
async fn subscribe_transforms_campaign_into_utm_attribution() -> Result<()> {
    let app = spawn_test_app().await?;

    Mock::given(path(app.upstream_subscriptions_path()))
        .and(method("POST"))
        .and(CampaignOnlyPayload)
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.upstream_server)
        .await;

    let res = app
        .post_subscribe(
            Some(ALLOWED_ORIGIN),
            &json!({
                "email": "jane@example.com",
                "campaign": "spring",
                "lead_magnet": "",
                "page_url": ""
            }),
        )
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn subscribe_with_disallowed_origin_is_403_and_never_calls_upstream() -> Result<()> {
    let app = spawn_test_app().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream_server)
        .await;

    for origin in [Some("https://blog.example.com.evil.net"), None] {
        let res = app
            .post_subscribe(origin, &json!({ "email": "jane@example.com" }))
            .await?;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = res.json().await?;
        assert_eq!(body["error"], json!("Origin not allowed"));
    }

    Ok(())
}

#[tokio::test]
async fn subscribe_without_email_is_400_and_never_calls_upstream() -> Result<()> {
    let app = spawn_test_app().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream_server)
        .await;

    let bodies = [
        (json!({}), "empty json"),
        (json!({ "email": "" }), "empty email"),
        (json!({ "email": "not-an-email" }), "no at sign"),
        (json!({ "email": "jane@example" }), "no dot after at"),
        (json!({ "email": "@example.com" }), "missing subject"),
    ];

    for (body, description) in bodies {
        let res = app.post_subscribe(Some(ALLOWED_ORIGIN), &body).await?;

        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "for request with: {description}"
        );
        let body: Value = res.json().await?;
        assert_eq!(body["error"], json!("Invalid email address"));
    }

    Ok(())
}

#[tokio::test]
async fn subscribe_with_malformed_json_is_400() -> Result<()> {
    let app = spawn_test_app().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream_server)
        .await;

    let res = app
        .post_subscribe_raw(Some(ALLOWED_ORIGIN), "{\"email\": ")
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    // Error responses carry CORS headers too.
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some(ALLOWED_ORIGIN)
    );
    let body: Value = res.json().await?;
    assert_eq!(body["error"], json!("Invalid JSON body"));

    Ok(())
}

#[tokio::test]
async fn subscribe_relays_upstream_rejection_status_and_message() -> Result<()> {
    let app = spawn_test_app().await?;

    Mock::given(path(app.upstream_subscriptions_path()))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "duplicate"})))
        .expect(1)
        .mount(&app.upstream_server)
        .await;

    let res = app
        .post_subscribe(
            Some(ALLOWED_ORIGIN),
            &json!({ "email": "jane@example.com" }),
        )
        .await?;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], json!("duplicate"));

    Ok(())
}

#[tokio::test]
async fn subscribe_upstream_rejection_without_message_gets_generic_error() -> Result<()> {
    let app = spawn_test_app().await?;

    Mock::given(path(app.upstream_subscriptions_path()))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .expect(1)
        .mount(&app.upstream_server)
        .await;

    let res = app
        .post_subscribe(
            Some(ALLOWED_ORIGIN),
            &json!({ "email": "jane@example.com" }),
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], json!("Subscription failed"));

    Ok(())
}

#[tokio::test]
async fn subscribe_upstream_timeout_is_500_and_not_retried() -> Result<()> {
    let app = spawn_test_app().await?;

    // Longer than the test client's 200ms timeout; expect(1) doubles as the
    // no-retry assertion.
    Mock::given(path(app.upstream_subscriptions_path()))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(180)))
        .expect(1)
        .mount(&app.upstream_server)
        .await;

    let res = app
        .post_subscribe(
            Some(ALLOWED_ORIGIN),
            &json!({ "email": "jane@example.com" }),
        )
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], json!("An error occurred. Please try again."));

    Ok(())
}
