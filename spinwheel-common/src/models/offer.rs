// File: spinwheel-common/src/models/offer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status value of an active offer or code. Any other value means suspended/exhausted.
pub const STATUS_ACTIVE: i32 = 0;

/// One redeemable code attached to an offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionCode {
    pub code: String,
    #[serde(default)]
    pub status: i32,
}

impl RedemptionCode {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

/// A discount definition as delivered by the catalog.
///
/// Read-only from the wheel's point of view. Draw records keep a full copy
/// of this struct, not a reference into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherOffer {
    pub id: String,
    pub name: String,
    pub discount: f64,
    /// Inclusive.
    pub starts_at: DateTime<Utc>,
    /// Inclusive.
    pub ends_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub min_purchase: f64,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub codes: Vec<RedemptionCode>,
}

impl VoucherOffer {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now <= self.ends_at
    }

    pub fn first_active_code(&self) -> Option<&RedemptionCode> {
        self.codes.iter().find(|c| c.is_active())
    }
}
