// File: spinwheel-core/tests/test_utils/helpers.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::watch;
use tokio::time::timeout;

use spinwheel_common::models::{RedemptionCode, SessionIdentity, VoucherOffer};
use spinwheel_core::catalog::StaticCatalog;
use spinwheel_core::spin::FixedOffset;
use spinwheel_core::state::WheelView;
use spinwheel_core::store::PersistentDrawStore;
use spinwheel_core::{SpinOrchestrator, WheelConfig};

/// Fixed "now" used across tests. Whole seconds so SQLite round-trips are exact.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

pub fn offer(id: &str) -> VoucherOffer {
    VoucherOffer {
        id: id.to_string(),
        name: format!("Voucher {id}"),
        discount: 10.0,
        starts_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        ends_at: Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap(),
        image: None,
        description: Some("Test voucher".to_string()),
        min_purchase: 0.0,
        status: 0,
        codes: vec![
            RedemptionCode { code: format!("{id}-USED"), status: 1 },
            RedemptionCode { code: format!("{id}-OPEN"), status: 0 },
        ],
    }
}

pub fn catalog(n: usize) -> Vec<VoucherOffer> {
    (0..n).map(|i| offer(&format!("v{i}"))).collect()
}

pub fn fast_config() -> WheelConfig {
    WheelConfig {
        spin_duration_ms: 30,
        ..WheelConfig::default()
    }
}

pub async fn mounted_wheel(
    config: WheelConfig,
    offers: Vec<VoucherOffer>,
    store: Arc<PersistentDrawStore>,
    session: watch::Receiver<SessionIdentity>,
    offset: f64,
) -> Arc<SpinOrchestrator> {
    let wheel = SpinOrchestrator::new(config, Arc::new(StaticCatalog::new(offers)), store, session)
        .with_sampler(Arc::new(FixedOffset(offset)));
    wheel.mount().await;
    Arc::new(wheel)
}

/// Wait (bounded) until the wheel view satisfies `pred`.
pub async fn wait_for_view<F>(wheel: &SpinOrchestrator, pred: F)
where
    F: FnMut(&WheelView) -> bool,
{
    let mut rx = wheel.subscribe_view();
    timeout(StdDuration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for wheel view")
        .expect("wheel view channel closed");
}
