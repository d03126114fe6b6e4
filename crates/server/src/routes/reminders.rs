//! Reminder sweep route handler.
//!
//! The email collaborator calls this on a schedule; it returns the stale
//! submitted items (with contact details from their shipping records) and
//! flags them so the next sweep skips them. Sending the email itself is the
//! collaborator's job.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use heirloom_core::{AlbumId, OrderId};
use heirloom_orders::CartItem;

use crate::error::Result;
use crate::state::AppState;

fn default_days() -> u32 {
    7
}

/// Sweep parameters.
#[derive(Debug, Deserialize)]
pub struct SweepRequest {
    /// Minimum age, in days, for a submitted item to count as stale.
    #[serde(default = "default_days")]
    pub days: u32,
}

/// Stale items collected by a sweep.
#[derive(Serialize)]
pub struct SweepResponse {
    pub items: Vec<CartItem>,
}

/// POST /albums/{album_id}/reminders/sweep
#[instrument(skip(state), fields(album_id = %album_id))]
pub async fn sweep(
    State(state): State<AppState>,
    Path(album_id): Path<AlbumId>,
    Json(request): Json<SweepRequest>,
) -> Result<Json<SweepResponse>> {
    let items = state.store().stale_submitted(album_id, request.days).await?;
    let ids: Vec<OrderId> = items.iter().map(|item| item.id).collect();
    state.store().mark_reminded(&ids).await?;

    tracing::info!(count = items.len(), "reminder sweep collected stale carts");
    Ok(Json(SweepResponse { items }))
}
