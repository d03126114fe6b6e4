//! Integration tests for Heirloom.
//!
//! The tests exercise the full ordering flow (catalog, selection, pricing,
//! cart, checkout) against [`MemoryRecords`] and the scriptable
//! [`heirloom_payments::MockGateway`], so they run without Postgres or
//! Stripe. Shared fixtures live here; the flows live in `tests/`.
//!
//! Fixture catalog:
//!
//! - Materials: Leather ($150, engraving, sizes Classic/Grand only),
//!   Linen (no upcharge, no engraving, any size)
//! - Sizes: Classic 10x10 ($75), Grand 12x12 ($125), Petite 8x8 (no upcharge)
//! - Engraving: cover engraving ($49, 20 characters)
//! - Designs: Signature ($500, one free album credit),
//!   Artisan ($350, no credit), Keepsake ($80, $1000 dollar credit)

use heirloom_core::{
    AlbumId, CartToken, ColorId, DesignIndex, Email, EngravingOptionId, MaterialId, Money, SizeId,
};
use heirloom_orders::{
    Catalog, ColorKind, ColorVariant, CustomerContact, Design, EngravingOption, Material,
    Selection, ShippingAddress, Size, TextureRegion,
};

/// The album every test orders against.
#[must_use]
pub fn album() -> AlbumId {
    AlbumId::new(7)
}

/// The studio's fixture catalog.
#[must_use]
pub fn studio_catalog() -> Catalog {
    let materials = vec![
        Material {
            id: MaterialId::new(1),
            name: "Leather".to_owned(),
            upcharge: Money::from_dollars(150),
            allow_engraving: true,
            colors: vec![
                ColorVariant {
                    id: ColorId::new(10),
                    name: "Espresso".to_owned(),
                    kind: ColorKind::Solid {
                        value: "#3b2f2f".to_owned(),
                    },
                    preview_image: None,
                },
                ColorVariant {
                    id: ColorId::new(11),
                    name: "Walnut".to_owned(),
                    kind: ColorKind::Texture {
                        reference: "walnut.jpg".to_owned(),
                        region: TextureRegion {
                            x: 0.25,
                            y: 0.5,
                            zoom: 1.5,
                        },
                    },
                    preview_image: Some("walnut-preview.jpg".to_owned()),
                },
            ],
            restricted_sizes: vec![SizeId::new(1), SizeId::new(2)],
        },
        Material {
            id: MaterialId::new(2),
            name: "Linen".to_owned(),
            upcharge: Money::ZERO,
            allow_engraving: false,
            colors: vec![ColorVariant {
                id: ColorId::new(20),
                name: "Oatmeal".to_owned(),
                kind: ColorKind::Solid {
                    value: "#d8cfc0".to_owned(),
                },
                preview_image: None,
            }],
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
        character_limit: 20,
        fonts: vec!["Classic Serif".to_owned(), "Modern Script".to_owned()],
    }];
    let designs = vec![
        Design {
            name: "Signature".to_owned(),
            base_price: Money::from_dollars(500),
            free_album_credits: 1,
            dollar_credit: Money::ZERO,
        },
        Design {
            name: "Artisan".to_owned(),
            base_price: Money::from_dollars(350),
            free_album_credits: 0,
            dollar_credit: Money::ZERO,
        },
        Design {
            name: "Keepsake".to_owned(),
            base_price: Money::from_dollars(80),
            free_album_credits: 0,
            dollar_credit: Money::from_dollars(1000),
        },
    ];
    Catalog::from_parts(materials, sizes, engraving_options, designs)
}

/// Engraved leather Signature album; prices at $774 before credit, $274 after.
#[must_use]
pub fn signature_selection() -> Selection {
    Selection {
        design_index: DesignIndex::new(0),
        material_id: MaterialId::new(1),
        color_id: Some(ColorId::new(10)),
        size_id: SizeId::new(1),
        engraving_option_id: Some(EngravingOptionId::new(1)),
        engraving_text: Some("The Harpers".to_owned()),
        engraving_font: Some("Classic Serif".to_owned()),
    }
}

/// Plain linen Artisan album; prices at $350 flat.
#[must_use]
pub fn artisan_selection() -> Selection {
    Selection {
        design_index: DesignIndex::new(1),
        material_id: MaterialId::new(2),
        color_id: Some(ColorId::new(20)),
        size_id: SizeId::new(3),
        engraving_option_id: None,
        engraving_text: None,
        engraving_font: None,
    }
}

/// Keepsake album whose dollar credit exceeds the subtotal.
#[must_use]
pub fn keepsake_selection() -> Selection {
    Selection {
        design_index: DesignIndex::new(2),
        material_id: MaterialId::new(2),
        color_id: None,
        size_id: SizeId::new(3),
        engraving_option_id: None,
        engraving_text: None,
        engraving_font: None,
    }
}

#[must_use]
pub fn shipping() -> ShippingAddress {
    ShippingAddress {
        name: "Sarah Harper".to_owned(),
        address1: "1 Main St".to_owned(),
        address2: Some("Apt 4".to_owned()),
        city: "Portland".to_owned(),
        state: "OR".to_owned(),
        zip: "97201".to_owned(),
    }
}

#[must_use]
pub fn customer() -> CustomerContact {
    CustomerContact {
        name: "Sarah Harper".to_owned(),
        email: Email::parse("sarah@example.com").expect("fixture email"),
        phone: "555-0100".to_owned(),
    }
}

/// A fresh client session.
#[must_use]
pub fn token() -> CartToken {
    CartToken::generate()
}
