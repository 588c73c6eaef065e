//! A headless rendition of the browser-side subscription form: local email
//! validation, a loading flag while the request is in flight, and the
//! user-facing feedback messages. One `SubscribeForm` per form on the page;
//! forms share no state.

use reqwest::Client;
use serde::Serialize;
use tracing::error;

use crate::web::data::{ApiResponse, ValidEmail, SUCCESS_MESSAGE};

pub const MSG_EMAIL_MISSING: &str = "Please enter your email address.";
pub const MSG_EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const MSG_IN_FLIGHT: &str = "Submission already in progress.";
pub const MSG_NETWORK_ERROR: &str = "Network error. Please try again.";
pub const MSG_SUBSCRIBE_FAILED: &str = "Subscription failed. Please try again.";

// ###################################
// ->   STRUCTS
// ###################################
/// Everything a form needs to operate; `campaign` and `lead_magnet` mirror
/// the data attributes attached to the form element.
#[derive(Debug, Clone, Default)]
pub struct FormConfig {
    pub endpoint_url: String,
    pub campaign: Option<String>,
    pub lead_magnet: Option<String>,
}

/// Conversion-tracking sink, invoked best-effort on success with the
/// campaign and lead-magnet labels. Absence is not an error.
type Tracker = Box<dyn Fn(&str, &str) + Send + Sync>;

pub struct SubscribeForm {
    http_client: Client,
    endpoint: reqwest::Url,
    campaign: Option<String>,
    lead_magnet: Option<String>,
    tracker: Option<Tracker>,
    state: FormState,
}

impl std::fmt::Debug for SubscribeForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscribeForm")
            .field("http_client", &self.http_client)
            .field("endpoint", &self.endpoint)
            .field("campaign", &self.campaign)
            .field("lead_magnet", &self.lead_magnet)
            .field("tracker", &self.tracker.as_ref().map(|_| "<tracker>"))
            .field("state", &self.state)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Loading,
}

/// What the visitor gets shown after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    pub is_error: bool,
}

impl Feedback {
    fn success(message: String) -> Self {
        Feedback {
            message,
            is_error: false,
        }
    }
    fn error<S: Into<String>>(message: S) -> Self {
        Feedback {
            message: message.into(),
            is_error: true,
        }
    }
}

/// The outbound body. All fields are always present, empty when unset,
/// matching what the proxy expects from the browser.
#[derive(Serialize, Debug)]
struct FormSubmission<'a> {
    email: &'a str,
    campaign: &'a str,
    lead_magnet: &'a str,
    page_url: &'a str,
}

// ###################################
// ->   IMPLS
// ###################################
impl SubscribeForm {
    /// Fails loudly when the endpoint URL is missing or unparseable; a form
    /// without a working endpoint must never get wired up.
    pub fn new(config: FormConfig) -> FormResult<Self> {
        let endpoint_url = config.endpoint_url.trim();
        if endpoint_url.is_empty() {
            return Err(FormError::EndpointMissing);
        }
        let endpoint = reqwest::Url::parse(endpoint_url)
            .map_err(|e| FormError::UrlParsing(e.to_string()))?;

        Ok(SubscribeForm {
            http_client: Client::new(),
            endpoint,
            campaign: config.campaign,
            lead_magnet: config.lead_magnet,
            tracker: None,
            state: FormState::Idle,
        })
    }

    pub fn with_tracker(mut self, tracker: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.tracker = Some(Box::new(tracker));
        self
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Handles one submission end to end. Invalid input is rejected locally
    /// with no network call; the loading state is cleared on every exit path.
    pub async fn submit(&mut self, email: &str, page_url: Option<&str>) -> Feedback {
        let email = email.trim();

        if email.is_empty() {
            return Feedback::error(MSG_EMAIL_MISSING);
        }
        if ValidEmail::parse(email).is_err() {
            return Feedback::error(MSG_EMAIL_INVALID);
        }

        // The disabled-button analogue.
        if self.state == FormState::Loading {
            return Feedback::error(MSG_IN_FLIGHT);
        }

        self.state = FormState::Loading;
        let feedback = self.post_submission(email, page_url).await;
        self.state = FormState::Idle;

        feedback
    }

    async fn post_submission(&self, email: &str, page_url: Option<&str>) -> Feedback {
        let submission = FormSubmission {
            email,
            campaign: self.campaign.as_deref().unwrap_or(""),
            lead_magnet: self.lead_magnet.as_deref().unwrap_or(""),
            page_url: page_url.unwrap_or(""),
        };

        let resp = match self
            .http_client
            .post(self.endpoint.clone())
            .json(&submission)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                // Network-level failures get logged, server-reported errors
                // below do not.
                error!("subscribe request failed: {e}");
                return Feedback::error(MSG_NETWORK_ERROR);
            }
        };

        // Parse the JSON body regardless of the HTTP status, error bodies
        // carry the message to show.
        let http_ok = resp.status().is_success();
        let result: ApiResponse = match resp.json().await {
            Ok(result) => result,
            Err(e) => {
                error!("subscribe response body unreadable: {e}");
                return Feedback::error(MSG_NETWORK_ERROR);
            }
        };

        if http_ok && result.success {
            if let Some(track) = &self.tracker {
                track(
                    self.campaign.as_deref().unwrap_or("default"),
                    self.lead_magnet.as_deref().unwrap_or(""),
                );
            }
            Feedback::success(
                result
                    .message
                    .unwrap_or_else(|| SUCCESS_MESSAGE.to_string()),
            )
        } else {
            Feedback::error(result.error.unwrap_or_else(|| MSG_SUBSCRIBE_FAILED.to_string()))
        }
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type FormResult<T> = core::result::Result<T, FormError>;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("no endpoint url configured")]
    EndpointMissing,
    #[error("endpoint url parsing error: {0}")]
    UrlParsing(String),
}
