//! Heirloom Payments - Payment gateway adapter.
//!
//! This crate is the boundary between the ordering core and the external
//! payment processor. The [`PaymentGateway`] trait covers the three
//! operations checkout needs - intent creation, confirmation lookup, and
//! refunds - and [`StripeGateway`] implements it against the Stripe
//! PaymentIntents REST API.
//!
//! # Design
//!
//! - Checkout never assumes success: confirmation is always fetched from the
//!   gateway, and timeouts fail closed as [`GatewayError::Unavailable`].
//! - [`GatewayError::user_message`] is the only text that may reach a client
//!   UI; the `Display` form carries operator detail for logs.
//! - [`MockGateway`] provides scripted confirmations for tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod error;
mod gateway;
mod mock;
mod stripe;

pub use error::GatewayError;
pub use gateway::{
    Confirmation, IntentRequest, PaymentGateway, PaymentIntent, Refund, RefundStatus,
};
pub use mock::MockGateway;
pub use stripe::StripeGateway;
