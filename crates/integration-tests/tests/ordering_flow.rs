//! End-to-end ordering flow without a payment gateway.
//!
//! Covers the full client journey: add, edit, remove, list, checkout, and
//! the reminder sweep, plus the cross-token isolation and atomicity rules.

use std::sync::Arc;

use heirloom_core::{Money, OrderStatus, PaymentStatus, SizeId};
use heirloom_orders::{
    CartError, CartStore, CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutRequest,
    MemoryRecords, NullEventSink, OrderRecords, Selection,
};

use heirloom_integration_tests::{
    album, artisan_selection, customer, shipping, signature_selection, studio_catalog, token,
};

fn store() -> Arc<CartStore<MemoryRecords>> {
    Arc::new(CartStore::new(MemoryRecords::new()))
}

fn orchestrator(store: &Arc<CartStore<MemoryRecords>>) -> CheckoutOrchestrator<MemoryRecords> {
    CheckoutOrchestrator::new(Arc::clone(store), None, Arc::new(NullEventSink))
}

fn request() -> CheckoutRequest {
    CheckoutRequest {
        customer: customer(),
        notes: Some("Gift wrap please".to_owned()),
        payment: None,
    }
}

#[tokio::test]
async fn test_full_flow_add_edit_checkout() {
    let store = store();
    let catalog = studio_catalog();
    let token = token();

    // Add two albums
    let first = store
        .add(&catalog, album(), &token, signature_selection(), shipping())
        .await
        .expect("add signature");
    let second = store
        .add(&catalog, album(), &token, artisan_selection(), shipping())
        .await
        .expect("add artisan");
    assert_eq!(first.pricing.total, Money::from_dollars(274));
    assert_eq!(second.pricing.total, Money::from_dollars(350));

    // Edit the second to a pricier size; the stored price follows
    let upsized = Selection {
        size_id: SizeId::new(2),
        ..artisan_selection()
    };
    let second = store
        .update(&catalog, album(), &token, second.id, upsized, shipping())
        .await
        .expect("update");
    assert_eq!(second.pricing.total, Money::from_dollars(475));

    assert_eq!(
        store.total(album(), &token).await.expect("total"),
        Money::from_dollars(749)
    );

    // Checkout finalizes both atomically
    let outcome = orchestrator(&store)
        .checkout(album(), &token, request())
        .await
        .expect("checkout");
    let CheckoutOutcome::Completed { order_ids, total } = outcome else {
        panic!("expected completed outcome");
    };
    assert_eq!(order_ids, vec![first.id, second.id]);
    assert_eq!(total, Money::from_dollars(749));

    // Both ordered, same timestamp, customer and notes stamped
    let a = store.records().get(first.id).await.expect("get").expect("item");
    let b = store.records().get(second.id).await.expect("get").expect("item");
    assert_eq!(a.status, OrderStatus::Ordered);
    assert_eq!(b.status, OrderStatus::Ordered);
    assert_eq!(a.ordered_at, b.ordered_at);
    assert_eq!(a.payment_status, PaymentStatus::NotRequired);
    assert_eq!(a.customer, Some(customer()));
    assert_eq!(a.notes.as_deref(), Some("Gift wrap please"));
}

#[tokio::test]
async fn test_ordered_items_leave_the_cart() {
    let store = store();
    let token = token();
    store
        .add(&studio_catalog(), album(), &token, artisan_selection(), shipping())
        .await
        .expect("add");

    orchestrator(&store)
        .checkout(album(), &token, request())
        .await
        .expect("checkout");

    // The cart only shows submitted items, so it is empty now
    assert!(store.list(album(), &token).await.expect("list").is_empty());
    assert_eq!(store.total(album(), &token).await.expect("total"), Money::ZERO);

    // And re-checkout finds nothing to finalize
    let result = orchestrator(&store)
        .checkout(album(), &token, request())
        .await;
    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
}

#[tokio::test]
async fn test_finalized_items_reject_edits() {
    let store = store();
    let catalog = studio_catalog();
    let token = token();
    let item = store
        .add(&catalog, album(), &token, artisan_selection(), shipping())
        .await
        .expect("add");

    orchestrator(&store)
        .checkout(album(), &token, request())
        .await
        .expect("checkout");

    let result = store
        .update(&catalog, album(), &token, item.id, artisan_selection(), shipping())
        .await;
    assert!(matches!(result, Err(CartError::InvalidState)));

    let result = store.remove(album(), &token, item.id).await;
    assert!(matches!(result, Err(CartError::InvalidState)));
}

#[tokio::test]
async fn test_tokens_are_isolated_end_to_end() {
    let store = store();
    let catalog = studio_catalog();
    let alice = token();
    let bob = token();

    let alice_item = store
        .add(&catalog, album(), &alice, signature_selection(), shipping())
        .await
        .expect("add alice");
    store
        .add(&catalog, album(), &bob, artisan_selection(), shipping())
        .await
        .expect("add bob");

    // Bob can neither see nor touch Alice's item
    let bob_items = store.list(album(), &bob).await.expect("list");
    assert_eq!(bob_items.len(), 1);
    assert!(bob_items.iter().all(|i| i.id != alice_item.id));
    let result = store.remove(album(), &bob, alice_item.id).await;
    assert!(matches!(result, Err(CartError::Forbidden)));

    // Bob's checkout finalizes only Bob's cart
    let outcome = orchestrator(&store)
        .checkout(album(), &bob, request())
        .await
        .expect("checkout");
    let CheckoutOutcome::Completed { order_ids, .. } = outcome else {
        panic!("expected completed outcome");
    };
    assert!(!order_ids.contains(&alice_item.id));

    let alice_item = store
        .records()
        .get(alice_item.id)
        .await
        .expect("get")
        .expect("item");
    assert_eq!(alice_item.status, OrderStatus::Submitted);
}

#[tokio::test]
async fn test_reminder_sweep_flags_stale_carts() {
    let store = store();
    let token = token();
    let item = store
        .add(&studio_catalog(), album(), &token, artisan_selection(), shipping())
        .await
        .expect("add");

    // Zero-day threshold makes the fresh cart count as stale
    let stale = store.stale_submitted(album(), 0).await.expect("stale");
    assert_eq!(stale.len(), 1);

    store.mark_reminded(&[item.id]).await.expect("mark");
    assert!(store.stale_submitted(album(), 0).await.expect("stale").is_empty());

    // A reminded cart still checks out normally
    let outcome = orchestrator(&store)
        .checkout(album(), &token, request())
        .await
        .expect("checkout");
    assert!(matches!(outcome, CheckoutOutcome::Completed { .. }));

    // Ordered items never show up as stale
    assert!(store.stale_submitted(album(), 0).await.expect("stale").is_empty());
}

#[tokio::test]
async fn test_concurrent_adds_from_one_token_all_land() {
    let store = store();
    let token = token();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            store
                .add(&studio_catalog(), album(), &token, artisan_selection(), shipping())
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("add");
    }

    assert_eq!(store.list(album(), &token).await.expect("list").len(), 8);
    assert_eq!(
        store.total(album(), &token).await.expect("total"),
        Money::from_dollars(2800)
    );
}
