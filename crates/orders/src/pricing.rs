//! Price computation for a resolved selection.
//!
//! Pure and deterministic: same resolved selection in, same breakdown out.
//! All arithmetic is fixed-point decimal via [`Money`]; no I/O, no floats.

use serde::{Deserialize, Serialize};

use heirloom_core::{CreditType, Money};

use crate::selection::ResolvedSelection;

/// Itemized price for one album order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: Money,
    pub material_upcharge: Money,
    pub size_upcharge: Money,
    pub engraving_upcharge: Money,
    /// base + all upcharges, before credit.
    pub subtotal: Money,
    pub credit_amount: Money,
    pub credit_type: CreditType,
    /// subtotal minus credit, floored at zero.
    pub total: Money,
}

impl PriceBreakdown {
    /// Price a resolved selection.
    ///
    /// Credit rules, in precedence order:
    /// - free album credits cover the design's base price only, never the
    ///   upcharges, and always win over a configured dollar credit;
    /// - a dollar credit is capped at the subtotal, so the total can never
    ///   go negative.
    #[must_use]
    pub fn compute(selection: &ResolvedSelection) -> Self {
        let base_price = selection.design.base_price;
        let material_upcharge = selection.material.upcharge;
        let size_upcharge = selection.size.upcharge;
        let engraving_upcharge = selection
            .engraving
            .as_ref()
            .map_or(Money::ZERO, |option| option.upcharge);

        let subtotal = base_price + material_upcharge + size_upcharge + engraving_upcharge;

        let (credit_amount, credit_type) = if selection.design.free_album_credits > 0 {
            (base_price, CreditType::FreeAlbum)
        } else if !selection.design.dollar_credit.is_zero() {
            (selection.design.dollar_credit.min(subtotal), CreditType::Dollar)
        } else {
            (Money::ZERO, CreditType::None)
        };

        let total = subtotal.saturating_sub(credit_amount);

        Self {
            base_price,
            material_upcharge,
            size_upcharge,
            engraving_upcharge,
            subtotal,
            credit_amount,
            credit_type,
            total,
        }
    }
}
