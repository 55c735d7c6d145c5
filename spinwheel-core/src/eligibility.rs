// src/eligibility.rs

use chrono::{DateTime, Utc};
use spinwheel_common::models::VoucherOffer;

/// Offers that can currently land on the wheel, in catalog order.
///
/// An offer is eligible iff it is active and `starts_at <= now <= ends_at`.
/// An empty result means the wheel is unavailable, not that something failed.
pub fn eligible_offers(catalog: &[VoucherOffer], now: DateTime<Utc>) -> Vec<VoucherOffer> {
    catalog
        .iter()
        .filter(|offer| offer.is_active() && offer.is_valid_at(now))
        .cloned()
        .collect()
}
