//! Scriptable in-memory gateway for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::gateway::{
    Confirmation, IntentRequest, PaymentGateway, PaymentIntent, Refund, RefundStatus,
};

/// A gateway whose confirmations are scripted up front.
///
/// Intents it creates confirm as succeeded for their full amount unless the
/// test scripts something else; `fail_all` makes every call return the given
/// error, for exercising the fail-closed paths.
#[derive(Default)]
pub struct MockGateway {
    intent_counter: AtomicU64,
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    confirmations: HashMap<String, Confirmation>,
    failure: Option<GatewayError>,
    created: Vec<IntentRequest>,
}

impl MockGateway {
    /// Create a gateway that confirms everything it issues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the confirmation returned for `intent_id`.
    pub fn script_confirmation(&self, intent_id: &str, confirmation: Confirmation) {
        self.lock().confirmations.insert(intent_id.to_owned(), confirmation);
    }

    /// Make every subsequent call fail with `error`.
    pub fn fail_all(&self, error: GatewayError) {
        self.lock().failure = Some(error);
    }

    /// Intent requests seen so far, in call order.
    #[must_use]
    pub fn created_intents(&self) -> Vec<IntentRequest> {
        self.lock().created.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // Mutex poisoning only happens if a test already panicked
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_failure(&self) -> Result<(), GatewayError> {
        match &self.lock().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, GatewayError> {
        self.check_failure()?;
        let n = self.intent_counter.fetch_add(1, Ordering::Relaxed);
        let intent_id = format!("pi_mock_{n}");
        let mut state = self.lock();
        state.confirmations.insert(
            intent_id.clone(),
            Confirmation {
                succeeded: true,
                amount_captured_cents: request.amount_cents,
            },
        );
        state.created.push(request);
        Ok(PaymentIntent {
            client_secret: format!("{intent_id}_secret"),
            intent_id,
        })
    }

    async fn confirmation(&self, intent_id: &str) -> Result<Confirmation, GatewayError> {
        self.check_failure()?;
        self.lock().confirmations.get(intent_id).copied().ok_or_else(|| {
            GatewayError::InvalidRequest(format!("no such payment intent: {intent_id}"))
        })
    }

    async fn refund(
        &self,
        charge_id: &str,
        amount_cents: Option<u64>,
    ) -> Result<Refund, GatewayError> {
        self.check_failure()?;
        Ok(Refund {
            refund_id: format!("re_mock_{charge_id}"),
            amount_cents: amount_cents.unwrap_or(0),
            status: RefundStatus::Succeeded,
        })
    }
}
