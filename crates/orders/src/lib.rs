//! Heirloom Orders - Album customization and ordering core.
//!
//! The client-facing flow runs entirely through this crate:
//!
//! 1. [`Catalog`] snapshots the studio's configured materials, sizes,
//!    engraving options, and the album's designs.
//! 2. [`Catalog::resolve`] validates a client [`Selection`] against that
//!    snapshot.
//! 3. [`PriceBreakdown::compute`] prices the resolved selection (pure,
//!    fixed-point arithmetic, credits applied with documented precedence).
//! 4. [`CartStore`] persists pending items keyed by `(album, cart token)`,
//!    serializing same-token operations through an internal lock registry.
//! 5. [`CheckoutOrchestrator`] atomically finalizes a token's cart, gated by
//!    payment confirmation when a gateway is configured, and emits a
//!    `CheckoutCompleted` event for the email/reporting collaborators.
//!
//! Storage is behind the [`OrderRecords`] trait; [`MemoryRecords`] backs
//! tests and single-process deployments, and `PgRecords` (with the
//! `postgres` feature) backs production.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod pricing;
pub mod selection;

pub use cart::{
    CartError, CartItem, CartStore, CustomerContact, MemoryRecords, OrderRecords,
    RepositoryError, ShippingAddress,
};
#[cfg(feature = "postgres")]
pub use cart::PgRecords;
pub use catalog::{
    Catalog, CatalogError, CatalogSource, ColorKind, ColorVariant, Design, EngravingOption,
    FixedCatalogSource, Material, Size, TextureRegion,
};
pub use checkout::{
    CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutRequest, CheckoutStamp,
    DomainEvent, EventSink, EventSinkError, NullEventSink, PaymentConfirmation,
};
pub use pricing::PriceBreakdown;
pub use selection::{ResolvedSelection, Selection, SelectionError, SelectionField};
