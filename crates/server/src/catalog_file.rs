//! Catalog loading from the studio's JSON configuration file.
//!
//! The studio curates one JSON file holding the global materials, sizes, and
//! engraving options plus the design list for each client album. The file is
//! read once at startup; editing it and restarting is the catalog admin
//! workflow.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use heirloom_core::AlbumId;
use heirloom_orders::{Design, EngravingOption, FixedCatalogSource, Material, Size};

/// Errors reading or parsing the catalog file.
#[derive(Debug, Error)]
pub enum CatalogFileError {
    #[error("cannot read catalog file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid catalog file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// On-disk catalog document.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    materials: Vec<Material>,
    sizes: Vec<Size>,
    #[serde(default)]
    engraving_options: Vec<EngravingOption>,
    #[serde(default)]
    albums: Vec<AlbumDesigns>,
}

/// Designs configured for one client album, in display order.
#[derive(Debug, Deserialize)]
struct AlbumDesigns {
    album_id: AlbumId,
    designs: Vec<Design>,
}

/// Load the catalog file into a [`FixedCatalogSource`].
///
/// # Errors
///
/// Returns [`CatalogFileError`] if the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> Result<FixedCatalogSource, CatalogFileError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&raw).map_err(|source| CatalogFileError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn parse_catalog(raw: &str) -> Result<FixedCatalogSource, serde_json::Error> {
    let file: CatalogFile = serde_json::from_str(raw)?;
    let designs: HashMap<AlbumId, Vec<Design>> = file
        .albums
        .into_iter()
        .map(|album| (album.album_id, album.designs))
        .collect();
    Ok(FixedCatalogSource {
        materials: file.materials,
        sizes: file.sizes,
        engraving_options: file.engraving_options,
        designs,
    })
}
