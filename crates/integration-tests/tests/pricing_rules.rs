//! Pricing rules exercised through the cart, not the calculator directly:
//! the price a cart item carries is the one the client is charged at
//! checkout, so these pin the whole path.

use std::sync::Arc;

use heirloom_core::{CreditType, Money, SizeId};
use heirloom_orders::{CartError, CartStore, MemoryRecords, Selection, SelectionField};

use heirloom_integration_tests::{
    album, artisan_selection, keepsake_selection, shipping, signature_selection, studio_catalog,
    token,
};

fn store() -> Arc<CartStore<MemoryRecords>> {
    Arc::new(CartStore::new(MemoryRecords::new()))
}

#[tokio::test]
async fn test_free_album_credit_covers_base_price_only() {
    // Signature: base 500 + leather 150 + classic 75 + engraving 49 = 774;
    // the free album credit covers the base price, upcharges remain
    let item = store()
        .add(&studio_catalog(), album(), &token(), signature_selection(), shipping())
        .await
        .expect("add");

    assert_eq!(item.pricing.subtotal, Money::from_dollars(774));
    assert_eq!(item.pricing.credit_type, CreditType::FreeAlbum);
    assert_eq!(item.pricing.credit_amount, Money::from_dollars(500));
    assert_eq!(item.pricing.total, Money::from_dollars(274));
}

#[tokio::test]
async fn test_uncredited_design_pays_full_subtotal() {
    let item = store()
        .add(&studio_catalog(), album(), &token(), artisan_selection(), shipping())
        .await
        .expect("add");

    assert_eq!(item.pricing.credit_type, CreditType::None);
    assert_eq!(item.pricing.total, Money::from_dollars(350));
}

#[tokio::test]
async fn test_dollar_credit_never_goes_negative() {
    // Keepsake: $80 subtotal against a $1000 credit floors at zero
    let item = store()
        .add(&studio_catalog(), album(), &token(), keepsake_selection(), shipping())
        .await
        .expect("add");

    assert_eq!(item.pricing.credit_type, CreditType::Dollar);
    assert_eq!(item.pricing.credit_amount, Money::from_dollars(80));
    assert_eq!(item.pricing.total, Money::ZERO);
}

#[tokio::test]
async fn test_invalid_selections_never_reach_the_cart() {
    let store = store();
    let token = token();

    // Leather is restricted to Classic and Grand; Petite fails
    let bad_size = Selection {
        size_id: SizeId::new(3),
        ..signature_selection()
    };
    let result = store
        .add(&studio_catalog(), album(), &token, bad_size, shipping())
        .await;
    match result {
        Err(CartError::Validation(err)) => assert_eq!(err.field, SelectionField::Size),
        other => panic!("expected size validation error, got {other:?}"),
    }

    // Linen does not allow engraving
    let engraved_linen = Selection {
        engraving_option_id: signature_selection().engraving_option_id,
        engraving_text: Some("The Harpers".to_owned()),
        ..artisan_selection()
    };
    let result = store
        .add(&studio_catalog(), album(), &token, engraved_linen, shipping())
        .await;
    match result {
        Err(CartError::Validation(err)) => {
            assert_eq!(err.field, SelectionField::EngravingNotAllowed);
        }
        other => panic!("expected engraving validation error, got {other:?}"),
    }

    // Over the 20-character engraving limit
    let long_engraving = Selection {
        engraving_text: Some("A".repeat(21)),
        ..signature_selection()
    };
    let result = store
        .add(&studio_catalog(), album(), &token, long_engraving, shipping())
        .await;
    match result {
        Err(CartError::Validation(err)) => {
            assert_eq!(err.field, SelectionField::EngravingTooLong);
        }
        other => panic!("expected length validation error, got {other:?}"),
    }

    assert!(store.list(album(), &token).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_edit_reprices_with_current_rules() {
    let store = store();
    let catalog = studio_catalog();
    let token = token();
    let item = store
        .add(&catalog, album(), &token, artisan_selection(), shipping())
        .await
        .expect("add");
    assert_eq!(item.pricing.total, Money::from_dollars(350));

    // Upgrading to the Grand size adds its upcharge on edit
    let upsized = Selection {
        size_id: SizeId::new(2),
        ..artisan_selection()
    };
    let item = store
        .update(&catalog, album(), &token, item.id, upsized, shipping())
        .await
        .expect("update");
    assert_eq!(item.pricing.total, Money::from_dollars(475));
}
