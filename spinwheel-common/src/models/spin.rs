// File: spinwheel-common/src/models/spin.rs

use serde::{Deserialize, Serialize};

use crate::models::offer::VoucherOffer;

/// Transient wheel state. Never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SpinState {
    #[default]
    Idle,
    /// Wheel is animating towards `rotation` degrees.
    Spinning { rotation: f64 },
    Result(VoucherOffer),
}

impl SpinState {
    pub fn is_spinning(&self) -> bool {
        matches!(self, SpinState::Spinning { .. })
    }
}
