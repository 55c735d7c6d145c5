// File: spinwheel-common/src/models/draw.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::offer::VoucherOffer;

/// Outcome of the most recent committed draw for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub user_id: String,
    pub drawn_at: DateTime<Utc>,
    /// Snapshot taken at draw time.
    pub offer: VoucherOffer,
}
