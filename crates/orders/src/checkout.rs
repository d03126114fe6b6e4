//! Checkout: atomic finalization of a token's cart.
//!
//! Preconditions (non-empty cart, confirmed payment) are checked before any
//! mutation; the finalize itself is a single all-or-nothing batch in the
//! records backend. The token lock is held for the whole operation, so an
//! edit or remove racing a checkout on the same token waits rather than
//! catching an item mid-transition.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use heirloom_core::{AlbumId, CartToken, Money, OrderId, PaymentStatus};
use heirloom_payments::{GatewayError, IntentRequest, PaymentGateway, PaymentIntent};

use crate::cart::{CartStore, CustomerContact, OrderRecords, RepositoryError};

/// Input to a checkout attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer: CustomerContact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Present on the second attempt, after the client completed payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentConfirmation>,
}

/// Reference to a payment the client claims to have completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub intent_id: String,
}

/// Values stamped onto every item when a cart is finalized.
#[derive(Debug, Clone)]
pub struct CheckoutStamp {
    pub customer: CustomerContact,
    pub notes: Option<String>,
    /// One timestamp shared by the whole batch.
    pub ordered_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    /// Amount the gateway reported captured, for reconciliation against the
    /// pricing snapshots. `None` when no payment was collected.
    pub amount_captured: Option<Money>,
}

/// Successful checkout results.
///
/// `PaymentRequired` is a distinguished success, not an error: the caller
/// collects payment and retries with a [`PaymentConfirmation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Completed {
        order_ids: Vec<OrderId>,
        total: Money,
    },
    PaymentRequired {
        amount_due: Money,
    },
}

/// Checkout failures. No state is mutated when any of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// No submitted items for this token (including re-checkout of an
    /// already-finalized cart).
    #[error("cart is empty")]
    EmptyCart,

    /// The referenced payment did not succeed or covered less than the
    /// cart total.
    #[error("payment was not confirmed")]
    PaymentNotConfirmed,

    /// The gateway timed out or could not be reached; fail closed.
    #[error("payment gateway unavailable")]
    GatewayUnavailable,

    /// Terminal gateway error (declined card, bad request, ...).
    #[error(transparent)]
    Gateway(GatewayError),

    /// Storage failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Domain events emitted for external collaborators (email, reporting).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    CheckoutCompleted {
        album_id: AlbumId,
        order_ids: Vec<OrderId>,
    },
}

/// Delivery failure from an event sink.
#[derive(Debug, thiserror::Error)]
#[error("event sink error: {0}")]
pub struct EventSinkError(pub String);

/// Fire-and-forget event delivery to external collaborators.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: DomainEvent) -> Result<(), EventSinkError>;
}

/// Sink that drops every event; for deployments without collaborators.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn emit(&self, _event: DomainEvent) -> Result<(), EventSinkError> {
        Ok(())
    }
}

/// Drives carts from `Submitted` to `Ordered`.
pub struct CheckoutOrchestrator<R> {
    store: Arc<CartStore<R>>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    events: Arc<dyn EventSink>,
}

impl<R: OrderRecords> CheckoutOrchestrator<R> {
    /// Create an orchestrator. Payment is required exactly when a gateway
    /// is configured.
    pub fn new(
        store: Arc<CartStore<R>>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            gateway,
            events,
        }
    }

    /// Whether this deployment collects payment at checkout.
    #[must_use]
    pub fn payment_required(&self) -> bool {
        self.gateway.is_some()
    }

    /// Create a payment intent for the current cart total.
    ///
    /// Called by the API layer after a `PaymentRequired` outcome so the
    /// client can complete payment and retry.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] when there is nothing to pay for, the
    /// mapped gateway error otherwise.
    pub async fn create_payment_intent(
        &self,
        album_id: AlbumId,
        token: &CartToken,
        receipt_email: Option<String>,
    ) -> Result<PaymentIntent, CheckoutError> {
        let Some(gateway) = &self.gateway else {
            return Err(CheckoutError::Gateway(GatewayError::InvalidRequest(
                "no payment gateway configured".to_owned(),
            )));
        };

        let total = self
            .store
            .total(album_id, token)
            .await
            .map_err(cart_to_checkout)?;
        if total.is_zero() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut metadata = HashMap::new();
        metadata.insert("album_id".to_owned(), album_id.to_string());
        metadata.insert("cart_token".to_owned(), token.to_string());

        gateway
            .create_intent(IntentRequest {
                amount_cents: total.as_cents(),
                currency: "usd".to_owned(),
                metadata,
                receipt_email,
            })
            .await
            .map_err(map_gateway_error)
    }

    /// Finalize every submitted item for this token.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]; nothing is mutated on any error path.
    pub async fn checkout(
        &self,
        album_id: AlbumId,
        token: &CartToken,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let _guard = self.store.lock_token(album_id, token).await;

        // Precondition 1: a non-empty cart. An already-ordered cart has no
        // submitted items left, so re-checkout lands here too.
        let items = self
            .store
            .list(album_id, token)
            .await
            .map_err(cart_to_checkout)?;
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total: Money = items.iter().map(|item| item.pricing.total).sum();

        // Precondition 2: confirmed payment covering the total, when a
        // gateway is configured. A fully credited cart totals zero and has
        // nothing to collect (the gateway cannot create a zero-amount
        // intent), so it completes unpaid.
        let (payment_status, amount_captured) = match (&self.gateway, &request.payment) {
            (None, _) => (PaymentStatus::NotRequired, None),
            (Some(_), None) if total.is_zero() => (PaymentStatus::NotRequired, None),
            (Some(_), None) => {
                return Ok(CheckoutOutcome::PaymentRequired { amount_due: total });
            }
            (Some(gateway), Some(confirmation)) => {
                let settled = gateway
                    .confirmation(&confirmation.intent_id)
                    .await
                    .map_err(map_gateway_error)?;
                if !settled.succeeded || settled.amount_captured_cents < total.as_cents() {
                    return Err(CheckoutError::PaymentNotConfirmed);
                }
                (
                    PaymentStatus::Paid,
                    Some(Money::from_cents(settled.amount_captured_cents)),
                )
            }
        };

        let order_ids: Vec<OrderId> = items.iter().map(|item| item.id).collect();
        let stamp = CheckoutStamp {
            customer: request.customer,
            notes: request.notes,
            ordered_at: Utc::now(),
            payment_status,
            amount_captured,
        };
        self.store.records().finalize_all(&order_ids, &stamp).await?;

        tracing::info!(
            album_id = %album_id,
            order_count = order_ids.len(),
            total = %total,
            "checkout completed"
        );

        // Fire-and-forget: collaborator failures never roll back a checkout.
        let event = DomainEvent::CheckoutCompleted {
            album_id,
            order_ids: order_ids.clone(),
        };
        if let Err(err) = self.events.emit(event).await {
            tracing::warn!(%err, "checkout event delivery failed");
        }

        Ok(CheckoutOutcome::Completed { order_ids, total })
    }
}

/// Cart read failures during checkout can only be repository errors; the
/// validation and ownership variants have no checkout read path.
fn cart_to_checkout(err: crate::cart::CartError) -> CheckoutError {
    match err {
        crate::cart::CartError::Repository(e) => CheckoutError::Repository(e),
        other => CheckoutError::Repository(RepositoryError::Database(other.to_string())),
    }
}

/// Collapse connectivity/timeout classes into the fail-closed variant;
/// everything else passes through as a terminal gateway error.
fn map_gateway_error(err: GatewayError) -> CheckoutError {
    if err.is_retryable() {
        CheckoutError::GatewayUnavailable
    } else {
        CheckoutError::Gateway(err)
    }
}
