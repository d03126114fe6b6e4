//! Checkout route handler.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use tracing::instrument;

use heirloom_core::{AlbumId, Money, OrderId};
use heirloom_orders::{CheckoutOutcome, CheckoutRequest};

use crate::error::Result;
use crate::extract::ClientToken;
use crate::state::AppState;

/// Checkout response.
///
/// `payment_required` is a non-final answer: the client completes payment
/// with the returned `client_secret` and posts checkout again with the
/// intent ID filled in.
#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutResponse {
    Completed {
        order_ids: Vec<OrderId>,
        total: Money,
    },
    PaymentRequired {
        amount_due: Money,
        client_secret: String,
    },
}

/// POST /albums/{album_id}/checkout
#[instrument(skip(state, token, request), fields(album_id = %album_id))]
pub async fn checkout(
    State(state): State<AppState>,
    Path(album_id): Path<AlbumId>,
    ClientToken(token): ClientToken,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let receipt_email = request.customer.email.as_str().to_owned();

    let outcome = state.checkout().checkout(album_id, &token, request).await?;
    let response = match outcome {
        CheckoutOutcome::Completed { order_ids, total } => {
            CheckoutResponse::Completed { order_ids, total }
        }
        CheckoutOutcome::PaymentRequired { amount_due } => {
            let intent = state
                .checkout()
                .create_payment_intent(album_id, &token, Some(receipt_email))
                .await?;
            CheckoutResponse::PaymentRequired {
                amount_due,
                client_secret: intent.client_secret,
            }
        }
    };
    Ok(Json(response))
}
