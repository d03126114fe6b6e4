//! The catalog: materials, sizes, engraving options, and per-album designs.
//!
//! Materials, sizes, and engraving options are studio-global; designs belong
//! to a client album. A [`Catalog`] is an immutable per-request snapshot
//! loaded from a [`CatalogSource`]; mutation happens through the admin
//! collaborator, never here. An empty catalog is valid - it just means every
//! selection fails validation downstream.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use heirloom_core::{
    AlbumId, ColorId, DesignIndex, EngravingOptionId, MaterialId, Money, SizeId,
};

/// An album cover material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Added to the design base price when this material is chosen.
    pub upcharge: Money,
    /// Whether engraving may be ordered on this material.
    pub allow_engraving: bool,
    /// Color variants available for this material.
    pub colors: Vec<ColorVariant>,
    /// Sizes this material can be produced in. Empty means all sizes.
    #[serde(default)]
    pub restricted_sizes: Vec<SizeId>,
}

impl Material {
    /// Look up a color variant by ID.
    #[must_use]
    pub fn color(&self, id: ColorId) -> Option<&ColorVariant> {
        self.colors.iter().find(|c| c.id == id)
    }

    /// Whether this material can be produced in the given size.
    #[must_use]
    pub fn allows_size(&self, id: SizeId) -> bool {
        self.restricted_sizes.is_empty() || self.restricted_sizes.contains(&id)
    }
}

/// A color variant of a material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorVariant {
    pub id: ColorId,
    pub name: String,
    #[serde(flatten)]
    pub kind: ColorKind,
    /// Optional preview image shown in the client UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
}

/// How a color variant renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorKind {
    /// A flat color value (e.g., "#2b2b2b").
    Solid { value: String },
    /// A crop of a texture image.
    Texture {
        /// Reference to the texture asset.
        reference: String,
        region: TextureRegion,
    },
}

/// Crop window into a texture image.
///
/// Stored as a structured numeric record end-to-end; never serialized into a
/// string that needs re-parsing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureRegion {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

/// An album size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Size {
    pub id: SizeId,
    pub name: String,
    /// Display string, e.g. "10x10\"".
    pub dimensions: String,
    pub upcharge: Money,
}

/// An engraving option (e.g., front-cover name engraving).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngravingOption {
    pub id: EngravingOptionId,
    pub name: String,
    pub upcharge: Money,
    /// Maximum engraving text length in characters; 0 means unlimited.
    pub character_limit: u32,
    /// Fonts offered for this option, in display order.
    pub fonts: Vec<String>,
}

/// An album design configured for a client album.
///
/// At most one of `free_album_credits` / `dollar_credit` is meaningful:
/// when free credits are configured the dollar credit is ignored by the
/// price calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    pub name: String,
    pub base_price: Money,
    /// Number of albums the client's package includes for free.
    #[serde(default)]
    pub free_album_credits: u32,
    /// Fixed dollar credit toward this design.
    #[serde(default)]
    pub dollar_credit: Money,
}

/// Errors loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The underlying source failed.
    #[error("catalog source error: {0}")]
    Source(String),
}

/// Read-only accessors the catalog snapshot is loaded from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn materials(&self) -> Result<Vec<Material>, CatalogError>;
    async fn sizes(&self) -> Result<Vec<Size>, CatalogError>;
    async fn engraving_options(&self) -> Result<Vec<EngravingOption>, CatalogError>;
    async fn designs(&self, album_id: AlbumId) -> Result<Vec<Design>, CatalogError>;
}

/// Immutable snapshot of the catalog for one client album.
///
/// Entities are held in ID-keyed maps; designs keep their configured order
/// since the design index is positional.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    materials: HashMap<MaterialId, Material>,
    sizes: HashMap<SizeId, Size>,
    engraving_options: HashMap<EngravingOptionId, EngravingOption>,
    designs: Vec<Design>,
}

impl Catalog {
    /// Snapshot the source for the given album.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the source fails; an empty source is not
    /// an error.
    pub async fn load(source: &dyn CatalogSource, album_id: AlbumId) -> Result<Self, CatalogError> {
        Ok(Self::from_parts(
            source.materials().await?,
            source.sizes().await?,
            source.engraving_options().await?,
            source.designs(album_id).await?,
        ))
    }

    /// Build a catalog directly from entity lists.
    #[must_use]
    pub fn from_parts(
        materials: Vec<Material>,
        sizes: Vec<Size>,
        engraving_options: Vec<EngravingOption>,
        designs: Vec<Design>,
    ) -> Self {
        Self {
            materials: materials.into_iter().map(|m| (m.id, m)).collect(),
            sizes: sizes.into_iter().map(|s| (s.id, s)).collect(),
            engraving_options: engraving_options.into_iter().map(|e| (e.id, e)).collect(),
            designs,
        }
    }

    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    #[must_use]
    pub fn size(&self, id: SizeId) -> Option<&Size> {
        self.sizes.get(&id)
    }

    #[must_use]
    pub fn engraving_option(&self, id: EngravingOptionId) -> Option<&EngravingOption> {
        self.engraving_options.get(&id)
    }

    #[must_use]
    pub fn design(&self, index: DesignIndex) -> Option<&Design> {
        self.designs.get(index.as_usize())
    }

    /// The album's designs in configured order.
    #[must_use]
    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn sizes(&self) -> impl Iterator<Item = &Size> {
        self.sizes.values()
    }

    pub fn engraving_options(&self) -> impl Iterator<Item = &EngravingOption> {
        self.engraving_options.values()
    }
}

/// In-memory catalog source backed by fixed entity lists.
///
/// Serves every album the same designs; used by tests and available to
/// single-studio deployments that configure one album at a time.
#[derive(Debug, Clone, Default)]
pub struct FixedCatalogSource {
    pub materials: Vec<Material>,
    pub sizes: Vec<Size>,
    pub engraving_options: Vec<EngravingOption>,
    pub designs: HashMap<AlbumId, Vec<Design>>,
}

#[async_trait]
impl CatalogSource for FixedCatalogSource {
    async fn materials(&self) -> Result<Vec<Material>, CatalogError> {
        Ok(self.materials.clone())
    }

    async fn sizes(&self) -> Result<Vec<Size>, CatalogError> {
        Ok(self.sizes.clone())
    }

    async fn engraving_options(&self) -> Result<Vec<EngravingOption>, CatalogError> {
        Ok(self.engraving_options.clone())
    }

    async fn designs(&self, album_id: AlbumId) -> Result<Vec<Design>, CatalogError> {
        Ok(self.designs.get(&album_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leather() -> Material {
        Material {
            id: MaterialId::new(1),
            name: "Leather".to_owned(),
            upcharge: Money::from_dollars(150),
            allow_engraving: true,
            colors: vec![ColorVariant {
                id: ColorId::new(10),
                name: "Espresso".to_owned(),
                kind: ColorKind::Solid {
                    value: "#3b2f2f".to_owned(),
                },
                preview_image: None,
            }],
            restricted_sizes: vec![SizeId::new(1)],
        }
    }

    #[test]
    fn test_material_color_lookup() {
        let material = leather();
        assert!(material.color(ColorId::new(10)).is_some());
        assert!(material.color(ColorId::new(11)).is_none());
    }

    #[test]
    fn test_restricted_sizes() {
        let material = leather();
        assert!(material.allows_size(SizeId::new(1)));
        assert!(!material.allows_size(SizeId::new(2)));

        let unrestricted = Material {
            restricted_sizes: vec![],
            ..leather()
        };
        assert!(unrestricted.allows_size(SizeId::new(2)));
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let catalog = Catalog::default();
        assert!(catalog.design(DesignIndex::new(0)).is_none());
        assert!(catalog.material(MaterialId::new(1)).is_none());
    }

    #[test]
    fn test_designs_keep_configured_order() {
        let designs = vec![
            Design {
                name: "Classic".to_owned(),
                base_price: Money::from_dollars(500),
                free_album_credits: 0,
                dollar_credit: Money::ZERO,
            },
            Design {
                name: "Deluxe".to_owned(),
                base_price: Money::from_dollars(800),
                free_album_credits: 0,
                dollar_credit: Money::ZERO,
            },
        ];
        let catalog = Catalog::from_parts(vec![], vec![], vec![], designs);
        assert_eq!(
            catalog.design(DesignIndex::new(1)).map(|d| d.name.as_str()),
            Some("Deluxe")
        );
    }

    #[tokio::test]
    async fn test_fixed_source_unknown_album_is_empty() {
        let source = FixedCatalogSource::default();
        let catalog = Catalog::load(&source, AlbumId::new(9)).await.expect("load");
        assert!(catalog.designs().is_empty());
    }

    #[test]
    fn test_color_kind_serde_shape() {
        let color = ColorVariant {
            id: ColorId::new(1),
            name: "Walnut".to_owned(),
            kind: ColorKind::Texture {
                reference: "walnut.jpg".to_owned(),
                region: TextureRegion {
                    x: 0.25,
                    y: 0.5,
                    zoom: 1.5,
                },
            },
            preview_image: None,
        };
        let json = serde_json::to_value(&color).expect("serialize");
        assert_eq!(json["kind"], "texture");
        assert_eq!(json["region"]["zoom"], 1.5);
    }
}
