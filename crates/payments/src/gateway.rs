//! The payment gateway trait and its wire-visible types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Operations the checkout orchestrator needs from a payment processor.
///
/// Implementations must apply a bounded timeout to every network call and
/// surface timeouts as [`GatewayError::Unavailable`] so checkout can fail
/// closed rather than assume success.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for the given amount.
    ///
    /// The returned client secret goes to the browser so the client UI can
    /// collect payment; the intent ID comes back to us in the checkout
    /// confirmation.
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, GatewayError>;

    /// Look up the current state of a payment intent.
    ///
    /// Checkout verifies `succeeded` and the captured amount before
    /// finalizing any order.
    async fn confirmation(&self, intent_id: &str) -> Result<Confirmation, GatewayError>;

    /// Refund a charge, fully (`amount_cents: None`) or partially.
    ///
    /// A partial amount exceeding the original charge is rejected by the
    /// gateway and surfaces as [`GatewayError::InvalidRequest`].
    async fn refund(
        &self,
        charge_id: &str,
        amount_cents: Option<u64>,
    ) -> Result<Refund, GatewayError>;
}

/// Parameters for creating a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRequest {
    /// Amount in the smallest currency unit (cents for USD).
    pub amount_cents: u64,
    /// ISO 4217 currency code, lowercase (e.g., "usd").
    pub currency: String,
    /// Free-form key/value metadata attached to the intent (album ID,
    /// cart token, etc.) for reconciliation in the gateway dashboard.
    pub metadata: HashMap<String, String>,
    /// Email address the gateway sends its receipt to.
    pub receipt_email: Option<String>,
}

/// A created payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway identifier for the intent.
    pub intent_id: String,
    /// Secret handed to the browser to complete payment.
    pub client_secret: String,
}

/// The settled state of a payment intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Confirmation {
    /// Whether the charge succeeded.
    pub succeeded: bool,
    /// Amount actually captured, in cents.
    pub amount_captured_cents: u64,
}

/// A processed refund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    /// Gateway identifier for the refund.
    pub refund_id: String,
    /// Refunded amount in cents.
    pub amount_cents: u64,
    /// Refund settlement state.
    pub status: RefundStatus,
}

/// Settlement state of a refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Succeeded,
    Failed,
}

impl RefundStatus {
    /// Parse a gateway status string, treating anything unknown as pending.
    #[must_use]
    pub fn from_gateway(status: &str) -> Self {
        match status {
            "succeeded" => Self::Succeeded,
            "failed" | "canceled" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refund_status_from_gateway() {
        assert_eq!(
            RefundStatus::from_gateway("succeeded"),
            RefundStatus::Succeeded
        );
        assert_eq!(RefundStatus::from_gateway("failed"), RefundStatus::Failed);
        assert_eq!(
            RefundStatus::from_gateway("canceled"),
            RefundStatus::Failed
        );
        assert_eq!(
            RefundStatus::from_gateway("requires_action"),
            RefundStatus::Pending
        );
    }
}
