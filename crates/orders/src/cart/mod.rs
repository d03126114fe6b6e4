//! The cart store: pending order persistence scoped by `(album, cart token)`.
//!
//! Every mutation validates against the catalog and re-prices before it
//! touches storage; a cart item therefore always carries a price breakdown
//! consistent with the selection it stores. Same-token operations are
//! serialized through a per-token lock registry so a rapid double-submit or
//! an edit racing a checkout can never interleave mid-transition; different
//! tokens proceed fully in parallel.

mod item;
#[cfg(feature = "postgres")]
mod pg;
mod records;

pub use item::{CartItem, CustomerContact, ShippingAddress};
#[cfg(feature = "postgres")]
pub use pg::PgRecords;
pub use records::{MemoryRecords, OrderRecords, RepositoryError};

use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use heirloom_core::{
    AlbumId, CartToken, Money, OrderId, OrderStatus, PaymentStatus,
};

use crate::catalog::Catalog;
use crate::pricing::PriceBreakdown;
use crate::selection::{Selection, SelectionError};

/// Errors from cart operations.
///
/// `NotFound` and `Forbidden` are distinct for logging but deliberately
/// share one user-facing message: whether an item does not exist or belongs
/// to another token must be indistinguishable to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The selection failed a catalog-consistency rule.
    #[error(transparent)]
    Validation(#[from] SelectionError),

    /// No such item.
    #[error("cannot modify this item")]
    NotFound,

    /// The item belongs to a different cart token.
    #[error("cannot modify this item")]
    Forbidden,

    /// The item has left `Submitted` and can no longer be edited.
    #[error("this item can no longer be edited")]
    InvalidState,

    /// Storage failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Registry of per-`(album, token)` locks.
///
/// Lock entries are created on first use and kept for the process lifetime;
/// cart-token cardinality is bounded by active client sessions.
#[derive(Debug, Default)]
struct TokenLocks {
    inner: StdMutex<HashMap<(AlbumId, CartToken), Arc<AsyncMutex<()>>>>,
}

impl TokenLocks {
    async fn acquire(&self, album_id: AlbumId, token: &CartToken) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(
                map.entry((album_id, token.clone()))
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

/// Persistence and mutation of pending cart items.
pub struct CartStore<R> {
    records: R,
    locks: TokenLocks,
}

impl<R: OrderRecords> CartStore<R> {
    #[must_use]
    pub fn new(records: R) -> Self {
        Self {
            records,
            locks: TokenLocks::default(),
        }
    }

    /// Direct access to the underlying records (read paths, admin tooling).
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Acquire the serialization lock for a token's cart.
    pub(crate) async fn lock_token(
        &self,
        album_id: AlbumId,
        token: &CartToken,
    ) -> OwnedMutexGuard<()> {
        self.locks.acquire(album_id, token).await
    }

    /// Validate, price, and persist a new cart item in `Submitted` status.
    ///
    /// # Errors
    ///
    /// [`CartError::Validation`] if the selection fails a catalog rule;
    /// [`CartError::Repository`] if storage fails.
    pub async fn add(
        &self,
        catalog: &Catalog,
        album_id: AlbumId,
        token: &CartToken,
        selection: Selection,
        shipping: ShippingAddress,
    ) -> Result<CartItem, CartError> {
        let _guard = self.lock_token(album_id, token).await;

        let resolved = catalog.resolve(&selection)?;
        let pricing = PriceBreakdown::compute(&resolved);

        let item = CartItem {
            id: OrderId::new(0), // assigned by the records backend
            album_id,
            cart_token: token.clone(),
            selection,
            shipping,
            customer: None,
            notes: None,
            status: OrderStatus::Submitted,
            payment_status: PaymentStatus::NotRequired,
            amount_captured: None,
            pricing,
            reminder_sent: false,
            created_at: Utc::now(),
            ordered_at: None,
            shipped_at: None,
        };

        let stored = self.records.insert(item).await?;
        tracing::debug!(order_id = %stored.id, album_id = %album_id, "cart item added");
        Ok(stored)
    }

    /// Re-validate, re-price, and overwrite an existing item in place.
    ///
    /// # Errors
    ///
    /// [`CartError::NotFound`] / [`CartError::Forbidden`] if the item is
    /// missing or owned by a different token; [`CartError::InvalidState`] if
    /// it is no longer `Submitted`; [`CartError::Validation`] if the new
    /// selection fails a catalog rule.
    pub async fn update(
        &self,
        catalog: &Catalog,
        album_id: AlbumId,
        token: &CartToken,
        order_id: OrderId,
        selection: Selection,
        shipping: ShippingAddress,
    ) -> Result<CartItem, CartError> {
        let _guard = self.lock_token(album_id, token).await;

        let existing = self.owned_editable(album_id, token, order_id).await?;

        let resolved = catalog.resolve(&selection)?;
        let pricing = PriceBreakdown::compute(&resolved);

        let updated = CartItem {
            selection,
            shipping,
            pricing,
            ..existing
        };
        self.records.update(&updated).await?;
        tracing::debug!(order_id = %order_id, "cart item updated");
        Ok(updated)
    }

    /// Remove a `Submitted` item owned by this token.
    ///
    /// # Errors
    ///
    /// Same ownership and state errors as [`CartStore::update`].
    pub async fn remove(
        &self,
        album_id: AlbumId,
        token: &CartToken,
        order_id: OrderId,
    ) -> Result<(), CartError> {
        let _guard = self.lock_token(album_id, token).await;

        self.owned_editable(album_id, token, order_id).await?;
        self.records.delete(order_id).await?;
        tracing::debug!(order_id = %order_id, "cart item removed");
        Ok(())
    }

    /// All `Submitted` items for this token, stable insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] if storage fails.
    pub async fn list(
        &self,
        album_id: AlbumId,
        token: &CartToken,
    ) -> Result<Vec<CartItem>, CartError> {
        Ok(self
            .records
            .list(album_id, token, OrderStatus::Submitted)
            .await?)
    }

    /// Sum of the `Submitted` items' totals.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] if storage fails.
    pub async fn total(&self, album_id: AlbumId, token: &CartToken) -> Result<Money, CartError> {
        let items = self.list(album_id, token).await?;
        Ok(items.iter().map(|item| item.pricing.total).sum())
    }

    /// Submitted items older than `days` with no reminder sent, for the
    /// external reminder sweep. The sweep sends the email; this core only
    /// reads and flags.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] if storage fails.
    pub async fn stale_submitted(
        &self,
        album_id: AlbumId,
        days: u32,
    ) -> Result<Vec<CartItem>, CartError> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        Ok(self.records.stale_submitted(album_id, cutoff).await?)
    }

    /// Flag items as reminded.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] if storage fails.
    pub async fn mark_reminded(&self, ids: &[OrderId]) -> Result<(), CartError> {
        Ok(self.records.mark_reminded(ids).await?)
    }

    /// Fetch an item and verify token ownership and editability.
    async fn owned_editable(
        &self,
        album_id: AlbumId,
        token: &CartToken,
        order_id: OrderId,
    ) -> Result<CartItem, CartError> {
        let item = self
            .records
            .get(order_id)
            .await?
            .ok_or(CartError::NotFound)?;
        if item.album_id != album_id || &item.cart_token != token {
            return Err(CartError::Forbidden);
        }
        if !item.status.is_editable() {
            return Err(CartError::InvalidState);
        }
        Ok(item)
    }
}
