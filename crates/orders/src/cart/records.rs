//! Order record persistence.
//!
//! [`OrderRecords`] is the only seam through which cart items reach storage;
//! nothing in the workspace writes order state around it. [`MemoryRecords`]
//! backs tests and single-process deployments; `PgRecords` (feature
//! `postgres`) backs production.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use heirloom_core::{AlbumId, CartToken, OrderId, OrderStatus};

use crate::cart::item::CartItem;
use crate::checkout::CheckoutStamp;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The underlying store failed.
    #[error("database error: {0}")]
    Database(String),

    /// The referenced record does not exist.
    #[error("record not found")]
    NotFound,

    /// The operation conflicts with the record's current state.
    #[error("conflicting record state: {0}")]
    Conflict(String),

    /// A stored value could not be interpreted.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

/// Storage operations for cart items / orders.
///
/// `finalize_all` must be all-or-nothing: either every listed item moves to
/// `Ordered` with the stamp applied, or none does. Implementations reject
/// the batch with [`RepositoryError::Conflict`] if any item is not currently
/// `Submitted`.
#[async_trait]
pub trait OrderRecords: Send + Sync {
    /// Persist a new item, assigning its ID. Returns the stored item.
    async fn insert(&self, item: CartItem) -> Result<CartItem, RepositoryError>;

    /// Fetch an item by ID.
    async fn get(&self, id: OrderId) -> Result<Option<CartItem>, RepositoryError>;

    /// Overwrite an existing item in place (same ID).
    async fn update(&self, item: &CartItem) -> Result<(), RepositoryError>;

    /// Delete an item.
    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError>;

    /// All items for `(album, token)` in `status`, stable insertion order.
    async fn list(
        &self,
        album_id: AlbumId,
        token: &CartToken,
        status: OrderStatus,
    ) -> Result<Vec<CartItem>, RepositoryError>;

    /// Atomically transition every listed item `Submitted -> Ordered`,
    /// applying the checkout stamp.
    async fn finalize_all(
        &self,
        ids: &[OrderId],
        stamp: &CheckoutStamp,
    ) -> Result<(), RepositoryError>;

    /// Submitted items for an album created before `cutoff` that have not
    /// been reminded about, stable insertion order.
    async fn stale_submitted(
        &self,
        album_id: AlbumId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CartItem>, RepositoryError>;

    /// Flag items as reminded so the sweep does not email twice.
    async fn mark_reminded(&self, ids: &[OrderId]) -> Result<(), RepositoryError>;
}

/// In-memory order records.
#[derive(Debug, Default)]
pub struct MemoryRecords {
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    // Sequence number preserves insertion order across the HashMap.
    items: HashMap<OrderId, (u64, CartItem)>,
    next_id: i32,
    next_seq: u64,
}

impl MemoryRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRecords for MemoryRecords {
    async fn insert(&self, mut item: CartItem) -> Result<CartItem, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        inner.next_seq += 1;
        item.id = OrderId::new(inner.next_id);
        let seq = inner.next_seq;
        inner.items.insert(item.id, (seq, item.clone()));
        Ok(item)
    }

    async fn get(&self, id: OrderId) -> Result<Option<CartItem>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.items.get(&id).map(|(_, item)| item.clone()))
    }

    async fn update(&self, item: &CartItem) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        match inner.items.get_mut(&item.id) {
            Some((_, stored)) => {
                *stored = item.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(
        &self,
        album_id: AlbumId,
        token: &CartToken,
        status: OrderStatus,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut matched: Vec<_> = inner
            .items
            .values()
            .filter(|(_, item)| {
                item.album_id == album_id && &item.cart_token == token && item.status == status
            })
            .cloned()
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched.into_iter().map(|(_, item)| item).collect())
    }

    async fn finalize_all(
        &self,
        ids: &[OrderId],
        stamp: &CheckoutStamp,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;

        // Validate the whole batch before touching anything
        for id in ids {
            let (_, item) = inner.items.get(id).ok_or(RepositoryError::NotFound)?;
            if !item.status.can_transition_to(OrderStatus::Ordered) {
                return Err(RepositoryError::Conflict(format!(
                    "order {id} is {} and cannot be finalized",
                    item.status
                )));
            }
        }

        for id in ids {
            if let Some((_, item)) = inner.items.get_mut(id) {
                item.status = OrderStatus::Ordered;
                item.ordered_at = Some(stamp.ordered_at);
                item.customer = Some(stamp.customer.clone());
                item.notes.clone_from(&stamp.notes);
                item.payment_status = stamp.payment_status;
                item.amount_captured = stamp.amount_captured;
            }
        }
        Ok(())
    }

    async fn stale_submitted(
        &self,
        album_id: AlbumId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut matched: Vec<_> = inner
            .items
            .values()
            .filter(|(_, item)| {
                item.album_id == album_id
                    && item.status == OrderStatus::Submitted
                    && !item.reminder_sent
                    && item.created_at < cutoff
            })
            .cloned()
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched.into_iter().map(|(_, item)| item).collect())
    }

    async fn mark_reminded(&self, ids: &[OrderId]) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        for id in ids {
            if let Some((_, item)) = inner.items.get_mut(id) {
                item.reminder_sent = true;
            }
        }
        Ok(())
    }
}
