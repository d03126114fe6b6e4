//! HTTP route handlers for the ordering API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//! GET    /health/ready                        - Readiness check (database)
//!
//! # Catalog
//! GET    /albums/{album_id}/catalog           - Catalog snapshot for an album
//!
//! # Cart (all require the X-Cart-Token header)
//! GET    /albums/{album_id}/cart              - List pending items + total
//! POST   /albums/{album_id}/cart              - Add an item
//! PUT    /albums/{album_id}/cart/{order_id}   - Edit an item
//! DELETE /albums/{album_id}/cart/{order_id}   - Remove an item
//!
//! # Checkout
//! POST   /albums/{album_id}/checkout          - Finalize the cart
//!
//! # Operator
//! POST   /albums/{album_id}/reminders/sweep   - Collect stale carts for the
//!                                               reminder email collaborator
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod reminders;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/albums/{album_id}/catalog", get(catalog::show))
        .route("/albums/{album_id}/cart", get(cart::index).post(cart::add))
        .route(
            "/albums/{album_id}/cart/{order_id}",
            put(cart::update).delete(cart::remove),
        )
        .route("/albums/{album_id}/checkout", post(checkout::checkout))
        .route("/albums/{album_id}/reminders/sweep", post(reminders::sweep))
}
