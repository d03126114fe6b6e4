//! Cart item / order entity.
//!
//! A cart item and an order are the same record at different lifecycle
//! stages; see `OrderStatus` for the transition table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use heirloom_core::{AlbumId, CartToken, Email, Money, OrderId, OrderStatus, PaymentStatus};

use crate::pricing::PriceBreakdown;
use crate::selection::Selection;

/// A pending or finalized album order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: OrderId,
    pub album_id: AlbumId,
    pub cart_token: CartToken,
    /// The raw selection as submitted; re-resolved on every edit.
    pub selection: Selection,
    pub shipping: ShippingAddress,
    /// Customer contact, stamped at checkout.
    pub customer: Option<CustomerContact>,
    /// Checkout notes, stamped at checkout.
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Amount the gateway reported captured at checkout, for reconciling
    /// against the pricing snapshot. `None` when no payment was collected.
    pub amount_captured: Option<Money>,
    /// Price snapshot taken when the item was added or last edited.
    pub pricing: PriceBreakdown,
    /// Set once the reminder sweep has emailed about this item.
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub ordered_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
}

/// Where the finished album ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Customer contact details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: Email,
    pub phone: String,
}
