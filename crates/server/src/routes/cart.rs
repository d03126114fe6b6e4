//! Cart route handlers.
//!
//! Every handler is scoped by the `X-Cart-Token` header; a token only ever
//! sees its own items.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use heirloom_core::{AlbumId, Money, OrderId};
use heirloom_orders::{CartItem, Catalog, Selection, ShippingAddress};

use crate::error::Result;
use crate::extract::ClientToken;
use crate::state::AppState;

/// Body for adding or editing a cart item.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub selection: Selection,
    pub shipping: ShippingAddress,
}

/// The token's pending cart.
#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total: Money,
}

/// GET /albums/{album_id}/cart
#[instrument(skip(state, token), fields(album_id = %album_id))]
pub async fn index(
    State(state): State<AppState>,
    Path(album_id): Path<AlbumId>,
    ClientToken(token): ClientToken,
) -> Result<Json<CartResponse>> {
    let items = state.store().list(album_id, &token).await?;
    let total = items.iter().map(|item| item.pricing.total).sum();
    Ok(Json(CartResponse { items, total }))
}

/// POST /albums/{album_id}/cart
#[instrument(skip(state, token, request), fields(album_id = %album_id))]
pub async fn add(
    State(state): State<AppState>,
    Path(album_id): Path<AlbumId>,
    ClientToken(token): ClientToken,
    Json(request): Json<ItemRequest>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let catalog = Catalog::load(state.catalog().as_ref(), album_id).await?;
    let item = state
        .store()
        .add(&catalog, album_id, &token, request.selection, request.shipping)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /albums/{album_id}/cart/{order_id}
#[instrument(skip(state, token, request), fields(album_id = %album_id, order_id = %order_id))]
pub async fn update(
    State(state): State<AppState>,
    Path((album_id, order_id)): Path<(AlbumId, OrderId)>,
    ClientToken(token): ClientToken,
    Json(request): Json<ItemRequest>,
) -> Result<Json<CartItem>> {
    let catalog = Catalog::load(state.catalog().as_ref(), album_id).await?;
    let item = state
        .store()
        .update(
            &catalog,
            album_id,
            &token,
            order_id,
            request.selection,
            request.shipping,
        )
        .await?;
    Ok(Json(item))
}

/// DELETE /albums/{album_id}/cart/{order_id}
#[instrument(skip(state, token), fields(album_id = %album_id, order_id = %order_id))]
pub async fn remove(
    State(state): State<AppState>,
    Path((album_id, order_id)): Path<(AlbumId, OrderId)>,
    ClientToken(token): ClientToken,
) -> Result<StatusCode> {
    state.store().remove(album_id, &token, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
