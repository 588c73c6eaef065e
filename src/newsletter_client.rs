use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::web::data::ValidSubscription;

/// UTM attribution attached to every signup that carries a campaign label.
const UTM_SOURCE: &str = "website";
const UTM_MEDIUM: &str = "subscribe_form";

#[derive(Debug)]
pub struct NewsletterClient {
    pub http_client: Client,
    pub api_url: String,
    pub publication_id: String,
    api_key: SecretString,
}

impl NewsletterClient {
    pub fn new<S: AsRef<str>>(
        api_url: S,
        publication_id: String,
        api_key: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        // Parse once up front so a broken config URL fails at startup.
        let api_url = reqwest::Url::parse(api_url.as_ref())
            .map_err(|e| Error::UrlParsing(e.to_string()))?
            .to_string();

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(NewsletterClient {
            http_client,
            api_url,
            publication_id,
            api_key,
        })
    }

    /// Creates a subscription for the provided subscriber with the upstream
    /// provider. A completed call with a non-success status is reported as
    /// `Error::UpstreamRejected`, carrying the upstream's status code and its
    /// `message` field if one was present in the response body.
    ///
    /// The call is attempted exactly once, failures are never retried here.
    pub async fn create_subscription(&self, subscription: &ValidSubscription) -> Result<()> {
        let url = reqwest::Url::parse(&format!(
            "{}/publications/{}/subscriptions",
            self.api_url.trim_end_matches('/'),
            self.publication_id
        ))
        .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let payload = SubscriptionPayload::from(subscription);

        let resp = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_owned)
                });
            return Err(Error::UpstreamRejected {
                status: status.as_u16(),
                message,
            });
        }

        // Only the status matters on the success path, the upstream body is
        // not inspected.
        Ok(())
    }
}

/// The upstream wire shape. Fields absent from the inbound request are
/// omitted entirely, no null placeholders.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct SubscriptionPayload<'a> {
    pub email: &'a str,
    pub reactivate_existing: bool,
    pub send_welcome_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referring_site: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<CustomField<'a>>>,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct CustomField<'a> {
    pub name: &'static str,
    pub value: &'a str,
}

impl<'a> From<&'a ValidSubscription> for SubscriptionPayload<'a> {
    fn from(sub: &'a ValidSubscription) -> Self {
        let campaign = sub.campaign.as_deref();
        SubscriptionPayload {
            email: sub.email.as_ref(),
            reactivate_existing: false,
            send_welcome_email: true,
            utm_source: campaign.map(|_| UTM_SOURCE),
            utm_medium: campaign.map(|_| UTM_MEDIUM),
            utm_campaign: campaign,
            referring_site: sub.page_url.as_deref(),
            custom_fields: sub.lead_magnet.as_deref().map(|value| {
                vec![CustomField {
                    name: "lead_magnet",
                    value,
                }]
            }),
        }
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, derive_more::From)]
pub enum Error {
    UrlParsing(String),
    UpstreamRejected {
        status: u16,
        message: Option<String>,
    },
    #[from]
    Transport(reqwest::Error),
}
// Error Boilerplate
impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
