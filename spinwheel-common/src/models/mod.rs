// File: spinwheel-common/src/models/mod.rs
pub mod countdown;
pub mod draw;
pub mod offer;
pub mod session;
pub mod spin;

pub use countdown::Countdown;
pub use draw::DrawRecord;
pub use offer::{RedemptionCode, VoucherOffer};
pub use session::SessionIdentity;
pub use spin::SpinState;
