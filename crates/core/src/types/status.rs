//! Status enums for cart items and payments.
//!
//! An order's lifecycle is linear: `submitted -> ordered -> shipped`. The
//! transition table lives here as [`OrderStatus::can_transition_to`] so no
//! caller ever compares raw status strings; anything outside the table is
//! rejected before it reaches storage.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a cart item / order.
///
/// A cart item is created `Submitted` when a client adds it to their cart,
/// becomes `Ordered` at checkout (atomically with every other item sharing
/// the cart token), and is marked `Shipped` manually by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Submitted,
    Ordered,
    Shipped,
}

impl OrderStatus {
    /// Whether the transition `self -> next` is allowed.
    ///
    /// The only legal transitions are `Submitted -> Ordered` and
    /// `Ordered -> Shipped`; no skips, no backward moves.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Submitted, Self::Ordered) | (Self::Ordered, Self::Shipped)
        )
    }

    /// Whether a client may still edit or remove the item.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Submitted)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Ordered => write!(f, "ordered"),
            Self::Shipped => write!(f, "shipped"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "ordered" => Ok(Self::Ordered),
            "shipped" => Ok(Self::Shipped),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The studio does not collect payment at checkout.
    #[default]
    NotRequired,
    /// A payment intent exists but has not been confirmed.
    Pending,
    /// Payment confirmed by the gateway.
    Paid,
}

/// Which kind of credit, if any, was applied to an order's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "credit_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    #[default]
    None,
    /// The design includes a free album; the credit covers the base price.
    FreeAlbum,
    /// A fixed dollar credit, capped at the order subtotal.
    Dollar,
}
