//! Stripe implementation of the payment gateway.
//!
//! Talks to the PaymentIntents and Refunds REST endpoints directly with
//! form-encoded requests. Only the three calls checkout needs are
//! implemented; everything else Stripe offers stays behind the dashboard.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::GatewayError;
use crate::gateway::{
    Confirmation, IntentRequest, PaymentGateway, PaymentIntent, Refund, RefundStatus,
};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// Bound on every gateway round-trip. On expiry the call surfaces as
/// `GatewayError::Unavailable` and checkout fails closed.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Stripe PaymentIntents gateway.
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: SecretString,
    base_url: String,
}

impl StripeGateway {
    /// Create a gateway with the given secret key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ApiConnection`] if the HTTP client cannot be
    /// constructed.
    pub fn new(secret_key: SecretString) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::ApiConnection(e.to_string()))?;

        Ok(Self {
            http,
            secret_key,
            base_url: DEFAULT_BASE_URL.to_owned(),
        })
    }

    /// Create a gateway from the `STRIPE_SECRET_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Authentication`] if the variable is unset.
    pub fn from_env() -> Result<Self, GatewayError> {
        let key = std::env::var("STRIPE_SECRET_KEY").map_err(|_| GatewayError::Authentication)?;
        Self::new(SecretString::from(key))
    }

    /// Point the gateway at a different base URL (stripe-mock, test server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_form(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .form(params)
            .send()
            .await?;
        Ok(response)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, GatewayError> {
        let mut params = vec![
            ("amount".to_owned(), request.amount_cents.to_string()),
            ("currency".to_owned(), request.currency),
            (
                "automatic_payment_methods[enabled]".to_owned(),
                "true".to_owned(),
            ),
        ];
        if let Some(email) = request.receipt_email {
            params.push(("receipt_email".to_owned(), email));
        }
        for (key, value) in request.metadata {
            params.push((format!("metadata[{key}]"), value));
        }

        let response = self.post_form("/v1/payment_intents", &params).await?;
        let intent: IntentResponse = decode(response).await?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            GatewayError::UnexpectedResponse("payment intent missing client_secret".to_owned())
        })?;

        tracing::debug!(intent_id = %intent.id, "created payment intent");
        Ok(PaymentIntent {
            intent_id: intent.id,
            client_secret,
        })
    }

    async fn confirmation(&self, intent_id: &str) -> Result<Confirmation, GatewayError> {
        let response = self.get(&format!("/v1/payment_intents/{intent_id}")).await?;
        let intent: IntentResponse = decode(response).await?;

        Ok(Confirmation {
            succeeded: intent.status.as_deref() == Some("succeeded"),
            amount_captured_cents: intent.amount_received.unwrap_or(0),
        })
    }

    async fn refund(
        &self,
        charge_id: &str,
        amount_cents: Option<u64>,
    ) -> Result<Refund, GatewayError> {
        let mut params = vec![("charge".to_owned(), charge_id.to_owned())];
        if let Some(amount) = amount_cents {
            params.push(("amount".to_owned(), amount.to_string()));
        }

        let response = self.post_form("/v1/refunds", &params).await?;
        let refund: RefundResponse = decode(response).await?;

        tracing::debug!(refund_id = %refund.id, charge_id, "created refund");
        Ok(Refund {
            refund_id: refund.id,
            amount_cents: refund.amount,
            status: RefundStatus::from_gateway(&refund.status),
        })
    }
}

/// Decode a Stripe response, mapping the error envelope on non-2xx statuses.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body)
            .map_err(|e| GatewayError::UnexpectedResponse(e.to_string()));
    }

    let envelope: ErrorEnvelope = serde_json::from_str(&body)
        .map_err(|_| GatewayError::UnexpectedResponse(format!("HTTP {status}: {body}")))?;
    Err(map_stripe_error(envelope.error))
}

fn map_stripe_error(error: StripeErrorBody) -> GatewayError {
    let message = error
        .message
        .unwrap_or_else(|| "payment was not accepted".to_owned());
    match error.error_type.as_deref() {
        Some("card_error") => GatewayError::Card {
            message,
            decline_code: error.decline_code,
        },
        Some("rate_limit_error") => GatewayError::RateLimited,
        Some("invalid_request_error") => GatewayError::InvalidRequest(message),
        Some("authentication_error") => GatewayError::Authentication,
        Some("api_connection_error") => GatewayError::ApiConnection(message),
        _ => GatewayError::UnexpectedResponse(message),
    }
}

// Minimal views of the Stripe response shapes; unknown fields are ignored.

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: Option<String>,
    status: Option<String>,
    amount_received: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
    amount: u64,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
    decline_code: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_card_error() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"type":"card_error","message":"Your card was declined.","decline_code":"generic_decline"}}"#,
        )
        .unwrap();
        let err = map_stripe_error(envelope.error);
        assert!(matches!(err, GatewayError::Card { .. }));
        assert_eq!(err.user_message(), "Your card was declined.");
    }

    #[test]
    fn test_map_error_types() {
        for (error_type, check) in [
            ("rate_limit_error", GatewayError::RateLimited),
            ("authentication_error", GatewayError::Authentication),
        ] {
            let err = map_stripe_error(StripeErrorBody {
                error_type: Some(error_type.to_owned()),
                message: None,
                decline_code: None,
            });
            assert_eq!(
                std::mem::discriminant(&err),
                std::mem::discriminant(&check)
            );
        }
    }

    #[test]
    fn test_map_invalid_request_keeps_operator_detail() {
        let err = map_stripe_error(StripeErrorBody {
            error_type: Some("invalid_request_error".to_owned()),
            message: Some("Refund amount exceeds charge amount".to_owned()),
            decline_code: None,
        });
        assert!(err.to_string().contains("exceeds charge amount"));
        assert!(!err.user_message().contains("exceeds charge amount"));
    }

    #[test]
    fn test_intent_response_decodes() {
        let intent: IntentResponse = serde_json::from_str(
            r#"{"id":"pi_123","client_secret":"pi_123_secret_x","status":"requires_payment_method","amount":27400,"currency":"usd"}"#,
        )
        .unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.amount_received, None);
    }
}
