use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use unicode_segmentation::UnicodeSegmentation;

pub const SUCCESS_MESSAGE: &str = "Successfully subscribed!";

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable Subscription
/// The inbound request shape. Can be Deserialized but can have invalid or
/// missing fields.
#[derive(Deserialize, Debug)]
pub struct DeserSubscription {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub lead_magnet: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}

/// Validated Subscription
/// A subscription request with a validated email, empty optionals dropped.
#[derive(Debug)]
pub struct ValidSubscription {
    pub email: ValidEmail,
    pub campaign: Option<String>,
    pub lead_magnet: Option<String>,
    pub page_url: Option<String>,
}

/// Validated Email
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

/// The normalized JSON shape every proxy response carries.
/// Success: `{"success": true, "message": ...}`; failure: `{"error": ...}`.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

// ###################################
// ->   IMPLS
// ###################################
impl TryFrom<DeserSubscription> for ValidSubscription {
    type Error = DataParsingError;

    fn try_from(deser_sub: DeserSubscription) -> Result<Self, Self::Error> {
        let email = none_if_empty(deser_sub.email).ok_or(DataParsingError::EmailMissing)?;

        Ok(ValidSubscription {
            email: ValidEmail::parse(email)?,
            campaign: none_if_empty(deser_sub.campaign),
            lead_magnet: none_if_empty(deser_sub.lead_magnet),
            page_url: none_if_empty(deser_sub.page_url),
        })
    }
}

/// Empty strings in the inbound request are treated the same as absent fields.
fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.graphemes(true).count() > 256 {
            return Err(DataParsingError::EmailTooLong);
        }

        // Same syntactic check the browser-side handler performs:
        // something@something.something, no whitespace, no extra '@'.
        if regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", value) {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

impl ApiResponse {
    pub fn subscribed() -> Self {
        ApiResponse {
            success: true,
            message: Some(SUCCESS_MESSAGE.to_string()),
            error: None,
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, Serialize)]
pub enum DataParsingError {
    EmailMissing,
    EmailInvalid,
    EmailTooLong,
}
// Error Boilerplate
impl core::fmt::Display for DataParsingError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for DataParsingError {}
