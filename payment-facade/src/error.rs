//! Error types for the payment facade.
//!
//! All fallible operations in this crate return [`Result<T>`], whose error type
//! [`FacadeError`] separates input that never left the process from rejections issued by
//! the payment provider.
//!
//! # Error Categories
//!
//! - **Validation Errors** ([`FacadeError::Validation`]): input rejected locally, nothing
//!   was sent
//! - **Provider Errors** ([`FacadeError::Provider`]): the provider answered with an error
//!   (unknown id, declined card, already refunded charge, bad API key)
//! - **Network Errors** ([`FacadeError::Http`]): the request never produced a response
//! - **Decode Errors** ([`FacadeError::Decode`]): a success response had an unexpected shape
//! - **Configuration Errors** ([`FacadeError::Config`]): invalid [`FacadeConfig`]
//!
//! [`FacadeConfig`]: crate::config::FacadeConfig
//!
//! # Examples
//!
//! ```
//! use payment_facade::error::{FacadeError, Result};
//!
//! fn require_charge_id(id: &str) -> Result<&str> {
//!     if id.is_empty() {
//!         return Err(FacadeError::Validation("charge id cannot be empty".to_owned()));
//!     }
//!     Ok(id)
//! }
//!
//! assert!(require_charge_id("ch_123").is_ok());
//! ```

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for facade operations.
pub type Result<T> = std::result::Result<T, FacadeError>;

/// Errors that can occur while talking to the payment provider.
///
/// Provider errors are propagated unchanged; the facade performs no recovery of its own.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum FacadeError {
    /// Input was rejected before any request was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The payment provider rejected the request.
    ///
    /// # Recovery
    ///
    /// Inspect [`ProviderError::kind`]. Card errors should be shown to the payer,
    /// authentication errors indicate a wrong or revoked API key, and invalid request
    /// errors usually mean an unknown id or an already fully refunded charge.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// HTTP request failed before a response was received.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, refused connections, DNS and TLS failures.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a success status but the body could not be decoded.
    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    /// Configuration is missing or invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FacadeError {
    /// Returns the provider error if this is a remote rejection.
    #[must_use]
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the provider reported that the requested resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.as_provider().is_some_and(ProviderError::is_not_found)
    }
}

/// Category of a provider-side error, as reported in the `type` field of the error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProviderErrorKind {
    /// Invalid parameters, unknown ids, or a request the resource state does not allow.
    #[serde(rename = "invalid_request_error")]
    InvalidRequest,
    /// The card or payment source was declined.
    #[serde(rename = "card_error")]
    Card,
    /// The API key was missing, malformed, or revoked.
    #[serde(rename = "authentication_error")]
    Authentication,
    /// The API key lacks permission for the resource.
    #[serde(rename = "permission_error")]
    Permission,
    /// Too many requests.
    #[serde(rename = "rate_limit_error")]
    RateLimit,
    /// An idempotency key was reused with different parameters.
    #[serde(rename = "idempotency_error")]
    Idempotency,
    /// Any other provider-side failure.
    #[serde(other, rename = "api_error")]
    Api,
}

impl ProviderErrorKind {
    /// Infers a kind from the HTTP status when the body carries none.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 404 => Self::InvalidRequest,
            401 => Self::Authentication,
            402 => Self::Card,
            403 => Self::Permission,
            409 => Self::Idempotency,
            429 => Self::RateLimit,
            _ => Self::Api,
        }
    }

    /// Returns the wire name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request_error",
            Self::Card => "card_error",
            Self::Authentication => "authentication_error",
            Self::Permission => "permission_error",
            Self::RateLimit => "rate_limit_error",
            Self::Idempotency => "idempotency_error",
            Self::Api => "api_error",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Provider rejected request ({status} {kind}): {message}")]
pub struct ProviderError {
    /// HTTP status of the response.
    pub status: u16,
    /// Error category.
    pub kind: ProviderErrorKind,
    /// Machine-readable error code, e.g. `resource_missing` or `charge_already_refunded`.
    pub code: Option<String>,
    /// Issuer decline code for card errors.
    pub decline_code: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Request parameter the error relates to.
    pub param: Option<String>,
}

impl ProviderError {
    /// Builds an error from a response status and body.
    ///
    /// The body is expected in the provider's envelope format
    /// (`{"error": {"type": ..., "message": ...}}`). Anything else is kept verbatim as the
    /// message with a kind inferred from the status.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: Body,
        }

        #[derive(Deserialize)]
        struct Body {
            #[serde(rename = "type")]
            kind: Option<ProviderErrorKind>,
            code: Option<String>,
            decline_code: Option<String>,
            message: Option<String>,
            param: Option<String>,
        }

        match serde_json::from_slice::<Envelope>(body) {
            Ok(Envelope { error }) => Self {
                status,
                kind: error.kind.unwrap_or_else(|| ProviderErrorKind::from_status(status)),
                code: error.code,
                decline_code: error.decline_code,
                message: error.message.unwrap_or_else(|| format!("HTTP status {status}")),
                param: error.param,
            },
            Err(_) => {
                let raw = String::from_utf8_lossy(body);
                let message =
                    if raw.trim().is_empty() { format!("HTTP status {status}") } else { raw.into() };
                Self {
                    status,
                    kind: ProviderErrorKind::from_status(status),
                    code: None,
                    decline_code: None,
                    message,
                    param: None,
                }
            }
        }
    }

    /// Returns true if the requested resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code.as_deref() == Some("resource_missing")
    }

    /// Returns true if the payment source was declined.
    #[must_use]
    pub fn is_card_error(&self) -> bool {
        self.kind == ProviderErrorKind::Card
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = FacadeError::Validation("bad reason".into());
        assert_eq!(error.to_string(), "Validation failed: bad reason");
    }

    #[test]
    fn test_config_error_display() {
        let error = FacadeError::Config("missing key".into());
        assert!(error.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_provider_error_from_envelope() {
        let body = br#"{"error":{"type":"invalid_request_error","code":"resource_missing","message":"No such coupon: 'nope'","param":"id"}}"#;
        let error = ProviderError::from_response(404, body);

        assert_eq!(error.status, 404);
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
        assert_eq!(error.code.as_deref(), Some("resource_missing"));
        assert_eq!(error.param.as_deref(), Some("id"));
        assert_eq!(error.message, "No such coupon: 'nope'");
        assert!(error.is_not_found());
        assert!(!error.is_card_error());
    }

    #[test]
    fn test_provider_error_card_decline() {
        let body = br#"{"error":{"type":"card_error","code":"card_declined","decline_code":"insufficient_funds","message":"Your card has insufficient funds."}}"#;
        let error = ProviderError::from_response(402, body);

        assert!(error.is_card_error());
        assert_eq!(error.decline_code.as_deref(), Some("insufficient_funds"));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_provider_error_unknown_type_is_api_error() {
        let body = br#"{"error":{"type":"something_new","message":"boom"}}"#;
        let error = ProviderError::from_response(500, body);
        assert_eq!(error.kind, ProviderErrorKind::Api);
        assert_eq!(error.message, "boom");
    }

    #[test]
    fn test_provider_error_unparsable_body() {
        let error = ProviderError::from_response(502, b"<html>Bad Gateway</html>");
        assert_eq!(error.kind, ProviderErrorKind::Api);
        assert_eq!(error.message, "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_provider_error_empty_body_infers_kind() {
        let error = ProviderError::from_response(401, b"");
        assert_eq!(error.kind, ProviderErrorKind::Authentication);
        assert_eq!(error.message, "HTTP status 401");
    }

    #[test]
    fn test_provider_error_display() {
        let error = ProviderError::from_response(
            400,
            br#"{"error":{"type":"invalid_request_error","code":"charge_already_refunded","message":"Charge ch_1 has already been refunded."}}"#,
        );
        let facade_error = FacadeError::from(error);
        assert_eq!(
            facade_error.to_string(),
            "Provider rejected request (400 invalid_request_error): Charge ch_1 has already been refunded."
        );
        assert!(facade_error.as_provider().is_some());
    }

    #[test]
    fn test_is_not_found_on_non_provider_error() {
        let error = FacadeError::Decode("truncated".into());
        assert!(!error.is_not_found());
        assert!(error.as_provider().is_none());
    }
}
