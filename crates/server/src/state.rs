//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use heirloom_orders::{
    CartStore, CatalogSource, CheckoutOrchestrator, NullEventSink, PgRecords,
};
use heirloom_payments::{PaymentGateway, StripeGateway};
use secrecy::SecretString;

use crate::config::ServerConfig;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("payment gateway setup failed: {0}")]
    Gateway(#[from] heirloom_payments::GatewayError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the cart store and checkout orchestrator.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    catalog: Arc<dyn CatalogSource>,
    store: Arc<CartStore<PgRecords>>,
    checkout: CheckoutOrchestrator<PgRecords>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// A Stripe gateway is wired in exactly when `STRIPE_SECRET_KEY` is
    /// configured; without it, checkout completes unpaid and the studio
    /// invoices out of band.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment gateway cannot be constructed.
    pub fn new(
        config: &ServerConfig,
        pool: PgPool,
        catalog: Arc<dyn CatalogSource>,
    ) -> Result<Self, StateError> {
        let store = Arc::new(CartStore::new(PgRecords::new(pool.clone())));
        let gateway = config
            .stripe_secret_key
            .clone()
            .map(build_gateway)
            .transpose()?;
        let checkout =
            CheckoutOrchestrator::new(Arc::clone(&store), gateway, Arc::new(NullEventSink));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool,
                catalog,
                store,
                checkout,
            }),
        })
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the catalog source.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogSource> {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn store(&self) -> &CartStore<PgRecords> {
        &self.inner.store
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutOrchestrator<PgRecords> {
        &self.inner.checkout
    }
}

fn build_gateway(key: SecretString) -> Result<Arc<dyn PaymentGateway>, StateError> {
    Ok(Arc::new(StripeGateway::new(key)?))
}
