//! Catalog route handler.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use tracing::instrument;

use heirloom_core::AlbumId;
use heirloom_orders::{Catalog, Design, EngravingOption, Material, Size};

use crate::error::Result;
use crate::state::AppState;

/// Catalog snapshot returned to the client configurator.
#[derive(Serialize)]
pub struct CatalogResponse {
    pub materials: Vec<Material>,
    pub sizes: Vec<Size>,
    pub engraving_options: Vec<EngravingOption>,
    /// The album's designs in configured order; selections reference them by
    /// position in this list.
    pub designs: Vec<Design>,
}

/// GET /albums/{album_id}/catalog
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(album_id): Path<AlbumId>,
) -> Result<Json<CatalogResponse>> {
    let catalog = Catalog::load(state.catalog().as_ref(), album_id).await?;

    let mut materials: Vec<Material> = catalog.materials().cloned().collect();
    materials.sort_by_key(|m| m.id.as_i32());
    let mut sizes: Vec<Size> = catalog.sizes().cloned().collect();
    sizes.sort_by_key(|s| s.id.as_i32());
    let mut engraving_options: Vec<EngravingOption> =
        catalog.engraving_options().cloned().collect();
    engraving_options.sort_by_key(|e| e.id.as_i32());

    Ok(Json(CatalogResponse {
        materials,
        sizes,
        engraving_options,
        designs: catalog.designs().to_vec(),
    }))
}
