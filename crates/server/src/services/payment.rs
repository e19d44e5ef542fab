//! Payment provider client and webhook verification.
//!
//! The provider hosts the actual payment page: checkout opens a session via
//! its REST API and redirects the buyer there. Status comes back
//! asynchronously through signed webhook deliveries.

use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use clementine_core::{Money, PaymentStatus};

use crate::config::PaymentConfig;

/// Signature header attached to every webhook delivery.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

type HmacSha256 = Hmac<Sha256>;

/// Errors from the payment provider integration.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status.
    #[error("provider returned {status}: {message}")]
    Provider { status: StatusCode, message: String },

    /// Webhook delivery without a signature header.
    #[error("missing webhook signature")]
    MissingSignature,

    /// Webhook signature did not verify against the shared secret.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Webhook body was not a recognizable event.
    #[error("malformed webhook event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// Event type outside the completed/failed/expired set.
    #[error("unsupported webhook event type: {0}")]
    UnsupportedEvent(String),
}

/// A session opened with the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    /// Provider-assigned session id; webhook deliveries carry it back.
    pub id: String,
    /// Hosted payment page the buyer is redirected to.
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'r> {
    amount: Decimal,
    currency: &'r str,
    reference: &'r str,
}

/// Thin client for the provider's session API.
pub struct PaymentClient {
    http: reqwest::Client,
    config: PaymentConfig,
}

impl PaymentClient {
    /// Create a client from the provider configuration.
    #[must_use]
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Open a hosted-payment session for one checkout.
    ///
    /// `reference` is an opaque local identifier echoed back in webhooks for
    /// debugging; reconciliation itself keys on the returned session id.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` on transport failure and
    /// `PaymentError::Provider` if the provider rejects the request.
    pub async fn create_session(
        &self,
        amount: Money,
        reference: &str,
    ) -> Result<ProviderSession, PaymentError> {
        let url = format!("{}/v1/sessions", self.config.api_base.trim_end_matches('/'));

        let response = self
            .http
            .post(url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&CreateSessionRequest {
                amount: amount.amount(),
                currency: "USD",
                reference,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider { status, message });
        }

        Ok(response.json::<ProviderSession>().await?)
    }

    /// Verify a webhook delivery and parse its event.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MissingSignature` / `InvalidSignature` if the
    /// signature header is absent or wrong, `MalformedEvent` if the body is
    /// not a recognizable event.
    pub fn parse_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookEvent, PaymentError> {
        let signature = signature.ok_or(PaymentError::MissingSignature)?;
        verify_signature(self.config.webhook_secret.expose_secret(), body, signature)?;
        WebhookEvent::from_body(body)
    }
}

/// Verify a hex-encoded HMAC-SHA256 signature over the raw body.
///
/// Comparison runs in constant time via `Mac::verify_slice`.
///
/// # Errors
///
/// Returns `PaymentError::InvalidSignature` on any mismatch, including
/// malformed hex.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> Result<(), PaymentError> {
    let provided = hex::decode(signature).map_err(|_| PaymentError::InvalidSignature)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(body);

    mac.verify_slice(&provided)
        .map_err(|_| PaymentError::InvalidSignature)
}

/// A provider event this service reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventType {
    Completed,
    Failed,
    Expired,
}

impl WebhookEventType {
    /// The payment status this event transitions to.
    #[must_use]
    pub const fn payment_status(self) -> PaymentStatus {
        match self {
            Self::Completed => PaymentStatus::Completed,
            Self::Failed => PaymentStatus::Failed,
            Self::Expired => PaymentStatus::Expired,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    session_id: String,
}

/// A verified, parsed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub event_type: WebhookEventType,
    pub session_id: String,
}

impl WebhookEvent {
    /// Parse an event from a raw webhook body.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MalformedEvent` for invalid JSON and
    /// `PaymentError::UnsupportedEvent` for event types outside the
    /// completed/failed/expired set.
    pub fn from_body(body: &[u8]) -> Result<Self, PaymentError> {
        let raw: RawEvent = serde_json::from_slice(body)?;

        let event_type = match raw.event_type.as_str() {
            "payment.completed" => WebhookEventType::Completed,
            "payment.failed" => WebhookEventType::Failed,
            "payment.expired" => WebhookEventType::Expired,
            other => return Err(PaymentError::UnsupportedEvent(other.to_owned())),
        };

        Ok(Self {
            event_type,
            session_id: raw.data.session_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_accepts_valid() {
        let body = br#"{"type":"payment.completed","data":{"session_id":"sess_1"}}"#;
        let signature = sign("whsec_test", body);
        assert!(verify_signature("whsec_test", body, &signature).is_ok());
    }

    #[test]
    fn test_verify_signature_rejects_tampered_body() {
        let body = br#"{"type":"payment.completed","data":{"session_id":"sess_1"}}"#;
        let signature = sign("whsec_test", body);

        let tampered = br#"{"type":"payment.completed","data":{"session_id":"sess_2"}}"#;
        assert!(matches!(
            verify_signature("whsec_test", tampered, &signature),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn test_verify_signature_rejects_wrong_secret() {
        let body = b"payload";
        let signature = sign("whsec_a", body);
        assert!(verify_signature("whsec_b", body, &signature).is_err());
    }

    #[test]
    fn test_verify_signature_rejects_bad_hex() {
        assert!(matches!(
            verify_signature("whsec_test", b"payload", "not hex!"),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn test_parse_event_completed() {
        let body = br#"{"type":"payment.completed","data":{"session_id":"sess_42"}}"#;
        let event = WebhookEvent::from_body(body).unwrap();
        assert_eq!(event.event_type, WebhookEventType::Completed);
        assert_eq!(event.session_id, "sess_42");
    }

    #[test]
    fn test_parse_event_failed_and_expired() {
        let failed = br#"{"type":"payment.failed","data":{"session_id":"s"}}"#;
        let expired = br#"{"type":"payment.expired","data":{"session_id":"s"}}"#;
        assert_eq!(
            WebhookEvent::from_body(failed).unwrap().event_type,
            WebhookEventType::Failed
        );
        assert_eq!(
            WebhookEvent::from_body(expired).unwrap().event_type,
            WebhookEventType::Expired
        );
    }

    #[test]
    fn test_parse_event_rejects_unknown_type() {
        let body = br#"{"type":"payment.refunded","data":{"session_id":"s"}}"#;
        assert!(matches!(
            WebhookEvent::from_body(body),
            Err(PaymentError::UnsupportedEvent(_))
        ));
    }

    #[test]
    fn test_parse_event_rejects_garbage() {
        assert!(matches!(
            WebhookEvent::from_body(b"not json"),
            Err(PaymentError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_event_status_mapping() {
        assert_eq!(
            WebhookEventType::Completed.payment_status(),
            PaymentStatus::Completed
        );
        assert_eq!(
            WebhookEventType::Failed.payment_status(),
            PaymentStatus::Failed
        );
        assert_eq!(
            WebhookEventType::Expired.payment_status(),
            PaymentStatus::Expired
        );
    }
}
