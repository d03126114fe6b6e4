//! Selection validation against the catalog.
//!
//! A [`Selection`] is exactly what the client UI submits; resolving it
//! checks every reference against the catalog snapshot, in a fixed order,
//! short-circuiting on the first failure. Resolution has no side effects.

use serde::{Deserialize, Serialize};

use heirloom_core::{ColorId, DesignIndex, EngravingOptionId, MaterialId, SizeId};

use crate::catalog::{Catalog, ColorVariant, Design, EngravingOption, Material, Size};

/// A client's raw album configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub design_index: DesignIndex,
    pub material_id: MaterialId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<ColorId>,
    pub size_id: SizeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engraving_option_id: Option<EngravingOptionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engraving_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engraving_font: Option<String>,
}

/// Which part of a selection failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionField {
    Design,
    Material,
    Color,
    Size,
    EngravingNotAllowed,
    EngravingTooLong,
}

impl std::fmt::Display for SelectionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Design => write!(f, "design"),
            Self::Material => write!(f, "material"),
            Self::Color => write!(f, "color"),
            Self::Size => write!(f, "size"),
            Self::EngravingNotAllowed => write!(f, "engraving_not_allowed"),
            Self::EngravingTooLong => write!(f, "engraving_too_long"),
        }
    }
}

/// A selection failed a catalog-consistency rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid selection: {field}")]
pub struct SelectionError {
    /// The first offending field, in check order.
    pub field: SelectionField,
}

impl SelectionError {
    const fn invalid(field: SelectionField) -> Self {
        Self { field }
    }
}

/// A selection with every reference resolved to its catalog entity.
///
/// Owning clones of the entities pins the prices the client saw; a later
/// catalog edit cannot retroactively change an item that was already priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSelection {
    pub design: Design,
    pub material: Material,
    pub color: Option<ColorVariant>,
    pub size: Size,
    pub engraving: Option<EngravingOption>,
    pub engraving_text: Option<String>,
    pub engraving_font: Option<String>,
}

impl Catalog {
    /// Validate a selection against this snapshot.
    ///
    /// Checks run in order and stop at the first failure:
    /// design, material, color-belongs-to-material, size (including the
    /// material's size restriction), then engraving (material must allow it
    /// and the text must fit the option's character limit; 0 = unlimited).
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] naming the first offending field.
    pub fn resolve(&self, selection: &Selection) -> Result<ResolvedSelection, SelectionError> {
        let design = self
            .design(selection.design_index)
            .ok_or(SelectionError::invalid(SelectionField::Design))?;

        let material = self
            .material(selection.material_id)
            .ok_or(SelectionError::invalid(SelectionField::Material))?;

        let color = selection
            .color_id
            .map(|id| {
                material
                    .color(id)
                    .cloned()
                    .ok_or(SelectionError::invalid(SelectionField::Color))
            })
            .transpose()?;

        let size = self
            .size(selection.size_id)
            .ok_or(SelectionError::invalid(SelectionField::Size))?;
        if !material.allows_size(size.id) {
            return Err(SelectionError::invalid(SelectionField::Size));
        }

        let engraving = selection
            .engraving_option_id
            .map(|id| {
                if !material.allow_engraving {
                    return Err(SelectionError::invalid(SelectionField::EngravingNotAllowed));
                }
                let option = self
                    .engraving_option(id)
                    .ok_or(SelectionError::invalid(SelectionField::EngravingNotAllowed))?;
                let text_len = selection
                    .engraving_text
                    .as_deref()
                    .map_or(0, |t| t.chars().count());
                let limit = usize::try_from(option.character_limit).unwrap_or(usize::MAX);
                if option.character_limit > 0 && text_len > limit {
                    return Err(SelectionError::invalid(SelectionField::EngravingTooLong));
                }
                Ok(option.clone())
            })
            .transpose()?;

        Ok(ResolvedSelection {
            design: design.clone(),
            material: material.clone(),
            color,
            size: size.clone(),
            engraving,
            engraving_text: selection.engraving_text.clone(),
            engraving_font: selection.engraving_font.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColorKind;
    use heirloom_core::Money;

    fn fixture() -> Catalog {
        let materials = vec![
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
                restricted_sizes: vec![SizeId::new(1), SizeId::new(2)],
            },
            Material {
                id: MaterialId::new(2),
                name: "Linen".to_owned(),
                upcharge: Money::ZERO,
                allow_engraving: false,
                colors: vec![],
                restricted_sizes: vec![],
            },
        ];
        let sizes = vec![
            Size {
                id: SizeId::new(1),
                name: "Classic".to_owned(),
                dimensions: "10x10\"".to_owned(),
                upcharge: Money::from_dollars(75),
            },
            Size {
                id: SizeId::new(2),
                name: "Grand".to_owned(),
                dimensions: "12x12\"".to_owned(),
                upcharge: Money::from_dollars(125),
            },
            Size {
                id: SizeId::new(3),
                name: "Petite".to_owned(),
                dimensions: "8x8\"".to_owned(),
                upcharge: Money::ZERO,
            },
        ];
        let engraving_options = vec![EngravingOption {
            id: EngravingOptionId::new(1),
            name: "Cover engraving".to_owned(),
            upcharge: Money::from_dollars(49),
            character_limit: 10,
            fonts: vec!["Classic Serif".to_owned()],
        }];
        let designs = vec![Design {
            name: "Signature".to_owned(),
            base_price: Money::from_dollars(500),
            free_album_credits: 0,
            dollar_credit: Money::ZERO,
        }];
        Catalog::from_parts(materials, sizes, engraving_options, designs)
    }

    fn base_selection() -> Selection {
        Selection {
            design_index: DesignIndex::new(0),
            material_id: MaterialId::new(1),
            color_id: Some(ColorId::new(10)),
            size_id: SizeId::new(1),
            engraving_option_id: None,
            engraving_text: None,
            engraving_font: None,
        }
    }

    fn field_of(result: Result<ResolvedSelection, SelectionError>) -> SelectionField {
        result.expect_err("expected invalid selection").field
    }

    #[test]
    fn test_valid_selection_resolves() {
        let resolved = fixture().resolve(&base_selection()).expect("resolve");
        assert_eq!(resolved.material.name, "Leather");
        assert_eq!(resolved.color.map(|c| c.name), Some("Espresso".to_owned()));
    }

    #[test]
    fn test_unknown_design() {
        let selection = Selection {
            design_index: DesignIndex::new(5),
            ..base_selection()
        };
        assert_eq!(field_of(fixture().resolve(&selection)), SelectionField::Design);
    }

    #[test]
    fn test_unknown_material() {
        let selection = Selection {
            material_id: MaterialId::new(99),
            ..base_selection()
        };
        assert_eq!(
            field_of(fixture().resolve(&selection)),
            SelectionField::Material
        );
    }

    #[test]
    fn test_color_must_belong_to_material() {
        let selection = Selection {
            color_id: Some(ColorId::new(99)),
            ..base_selection()
        };
        assert_eq!(field_of(fixture().resolve(&selection)), SelectionField::Color);
    }

    #[test]
    fn test_color_is_optional() {
        let selection = Selection {
            color_id: None,
            ..base_selection()
        };
        assert!(fixture().resolve(&selection).is_ok());
    }

    #[test]
    fn test_size_restriction() {
        // Size 3 exists but leather is restricted to sizes 1 and 2
        let selection = Selection {
            size_id: SizeId::new(3),
            ..base_selection()
        };
        assert_eq!(field_of(fixture().resolve(&selection)), SelectionField::Size);

        // Unrestricted material accepts any configured size
        let selection = Selection {
            material_id: MaterialId::new(2),
            color_id: None,
            size_id: SizeId::new(3),
            ..base_selection()
        };
        assert!(fixture().resolve(&selection).is_ok());
    }

    #[test]
    fn test_engraving_requires_material_support() {
        let selection = Selection {
            material_id: MaterialId::new(2),
            color_id: None,
            engraving_option_id: Some(EngravingOptionId::new(1)),
            engraving_text: Some("SM".to_owned()),
            ..base_selection()
        };
        assert_eq!(
            field_of(fixture().resolve(&selection)),
            SelectionField::EngravingNotAllowed
        );
    }

    #[test]
    fn test_engraving_character_limit() {
        // Limit is 10: eleven characters fails, exactly ten passes
        let selection = Selection {
            engraving_option_id: Some(EngravingOptionId::new(1)),
            engraving_text: Some("elevenchars".to_owned()),
            ..base_selection()
        };
        assert_eq!(
            field_of(fixture().resolve(&selection)),
            SelectionField::EngravingTooLong
        );

        let selection = Selection {
            engraving_option_id: Some(EngravingOptionId::new(1)),
            engraving_text: Some("exactly_10".to_owned()),
            ..base_selection()
        };
        assert!(fixture().resolve(&selection).is_ok());
    }

    #[test]
    fn test_zero_character_limit_is_unlimited() {
        let mut catalog = fixture();
        let unlimited = EngravingOption {
            id: EngravingOptionId::new(2),
            name: "Spine engraving".to_owned(),
            upcharge: Money::from_dollars(29),
            character_limit: 0,
            fonts: vec![],
        };
        catalog = Catalog::from_parts(
            catalog.materials().cloned().collect(),
            catalog.sizes().cloned().collect(),
            catalog.engraving_options().cloned().chain([unlimited]).collect(),
            catalog.designs().to_vec(),
        );

        let selection = Selection {
            engraving_option_id: Some(EngravingOptionId::new(2)),
            engraving_text: Some("a".repeat(500)),
            ..base_selection()
        };
        assert!(catalog.resolve(&selection).is_ok());
    }

    #[test]
    fn test_character_limit_counts_chars_not_bytes() {
        let selection = Selection {
            engraving_option_id: Some(EngravingOptionId::new(1)),
            // Ten characters, more than ten bytes
            engraving_text: Some("ämöréchars".to_owned()),
            ..base_selection()
        };
        assert!(fixture().resolve(&selection).is_ok());
    }
}
