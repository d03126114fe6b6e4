//! Postgres-backed order records.
//!
//! Scalar lifecycle fields get typed columns (they are queried and indexed);
//! the selection, shipping, customer, and pricing records are stored as
//! `jsonb` snapshots since the database never filters on their contents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use heirloom_core::{AlbumId, CartToken, OrderId, OrderStatus};

use crate::cart::item::{CartItem, CustomerContact, ShippingAddress};
use crate::cart::records::{OrderRecords, RepositoryError};
use crate::checkout::CheckoutStamp;
use crate::pricing::PriceBreakdown;
use crate::selection::Selection;

const SELECT_COLUMNS: &str = "id, album_id, cart_token, selection, shipping, customer, notes, \
     status, payment_status, amount_captured, pricing, reminder_sent, created_at, ordered_at, \
     shipped_at";

/// Order records stored in Postgres.
#[derive(Clone)]
pub struct PgRecords {
    pool: PgPool,
}

impl PgRecords {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_item(row: &PgRow) -> Result<CartItem, RepositoryError> {
    Ok(CartItem {
        id: row.try_get("id")?,
        album_id: row.try_get("album_id")?,
        cart_token: CartToken::new(row.try_get::<String, _>("cart_token")?),
        selection: row.try_get::<Json<Selection>, _>("selection")?.0,
        shipping: row.try_get::<Json<ShippingAddress>, _>("shipping")?.0,
        customer: row
            .try_get::<Option<Json<CustomerContact>>, _>("customer")?
            .map(|json| json.0),
        notes: row.try_get("notes")?,
        status: row.try_get("status")?,
        payment_status: row.try_get("payment_status")?,
        amount_captured: row.try_get("amount_captured")?,
        pricing: row.try_get::<Json<PriceBreakdown>, _>("pricing")?.0,
        reminder_sent: row.try_get("reminder_sent")?,
        created_at: row.try_get("created_at")?,
        ordered_at: row.try_get("ordered_at")?,
        shipped_at: row.try_get("shipped_at")?,
    })
}

#[async_trait]
impl OrderRecords for PgRecords {
    async fn insert(&self, item: CartItem) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO orders (album_id, cart_token, selection, shipping, customer, notes, \
             status, payment_status, amount_captured, pricing, reminder_sent, created_at, \
             ordered_at, shipped_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING id",
        )
        .bind(item.album_id)
        .bind(item.cart_token.as_str())
        .bind(Json(&item.selection))
        .bind(Json(&item.shipping))
        .bind(item.customer.as_ref().map(Json))
        .bind(&item.notes)
        .bind(item.status)
        .bind(item.payment_status)
        .bind(item.amount_captured)
        .bind(Json(&item.pricing))
        .bind(item.reminder_sent)
        .bind(item.created_at)
        .bind(item.ordered_at)
        .bind(item.shipped_at)
        .fetch_one(&self.pool)
        .await?;

        let id: OrderId = row.try_get("id")?;
        Ok(CartItem { id, ..item })
    }

    async fn get(&self, id: OrderId) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_item).transpose()
    }

    async fn update(&self, item: &CartItem) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET selection = $2, shipping = $3, customer = $4, notes = $5, \
             status = $6, payment_status = $7, amount_captured = $8, pricing = $9, \
             reminder_sent = $10, ordered_at = $11, shipped_at = $12 \
             WHERE id = $1",
        )
        .bind(item.id)
        .bind(Json(&item.selection))
        .bind(Json(&item.shipping))
        .bind(item.customer.as_ref().map(Json))
        .bind(&item.notes)
        .bind(item.status)
        .bind(item.payment_status)
        .bind(item.amount_captured)
        .bind(Json(&item.pricing))
        .bind(item.reminder_sent)
        .bind(item.ordered_at)
        .bind(item.shipped_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        album_id: AlbumId,
        token: &CartToken,
        status: OrderStatus,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders \
             WHERE album_id = $1 AND cart_token = $2 AND status = $3 \
             ORDER BY id"
        ))
        .bind(album_id)
        .bind(token.as_str())
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_item).collect()
    }

    async fn finalize_all(
        &self,
        ids: &[OrderId],
        stamp: &CheckoutStamp,
    ) -> Result<(), RepositoryError> {
        let id_values: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let mut tx = self.pool.begin().await?;

        // Lock the batch and validate every status before writing
        let rows = sqlx::query("SELECT id, status FROM orders WHERE id = ANY($1) FOR UPDATE")
            .bind(&id_values)
            .fetch_all(&mut *tx)
            .await?;
        if rows.len() != ids.len() {
            return Err(RepositoryError::NotFound);
        }
        for row in &rows {
            let status: OrderStatus = row.try_get("status")?;
            if !status.can_transition_to(OrderStatus::Ordered) {
                let id: OrderId = row.try_get("id")?;
                return Err(RepositoryError::Conflict(format!(
                    "order {id} is {status} and cannot be finalized"
                )));
            }
        }

        sqlx::query(
            "UPDATE orders SET status = $2, ordered_at = $3, customer = $4, notes = $5, \
             payment_status = $6, amount_captured = $7 \
             WHERE id = ANY($1)",
        )
        .bind(&id_values)
        .bind(OrderStatus::Ordered)
        .bind(stamp.ordered_at)
        .bind(Json(&stamp.customer))
        .bind(&stamp.notes)
        .bind(stamp.payment_status)
        .bind(stamp.amount_captured)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn stale_submitted(
        &self,
        album_id: AlbumId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders \
             WHERE album_id = $1 AND status = $2 AND NOT reminder_sent AND created_at < $3 \
             ORDER BY id"
        ))
        .bind(album_id)
        .bind(OrderStatus::Submitted)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_item).collect()
    }

    async fn mark_reminded(&self, ids: &[OrderId]) -> Result<(), RepositoryError> {
        let id_values: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        sqlx::query("UPDATE orders SET reminder_sent = TRUE WHERE id = ANY($1)")
            .bind(&id_values)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
