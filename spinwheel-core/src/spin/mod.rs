// src/spin/mod.rs
//
// The draw operation: session check, eligibility, cooldown, random stop,
// timed reveal, commit.

pub mod sampler;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use spinwheel_common::models::{Countdown, SessionIdentity, VoucherOffer};
use spinwheel_common::traits::repository_traits::CatalogSource;
use spinwheel_common::DrawError;

use crate::config::WheelConfig;
use crate::cooldown::{CooldownGate, GateState};
use crate::eligibility::eligible_offers;
use crate::eventbus::{EventBus, WheelEvent};
use crate::segment::{map_rotation_to_index, segment_layout, spin_rotation, SegmentSpan};
use crate::session::SessionReconciler;
use crate::state::{WheelState, WheelView};
use crate::store::PersistentDrawStore;

pub use sampler::{FixedOffset, OffsetSampler, ThreadRngSampler};

/// A committed draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOutcome {
    pub offer: VoucherOffer,
    pub drawn_at: DateTime<Utc>,
    /// Total rotation the wheel animated through, in degrees.
    pub rotation: f64,
    /// Index of `offer` in the eligible list the wheel was drawn from.
    pub index: usize,
    /// First unused redemption code of the offer, if it has one.
    pub code: Option<String>,
}

pub struct SpinOrchestrator {
    config: WheelConfig,
    gate: CooldownGate,
    catalog_source: Arc<dyn CatalogSource>,
    catalog: RwLock<Vec<VoucherOffer>>,
    store: Arc<PersistentDrawStore>,
    session: watch::Receiver<SessionIdentity>,
    state: Arc<WheelState>,
    reconciler: Arc<SessionReconciler>,
    bus: EventBus,
    sampler: Arc<dyn OffsetSampler>,
    /// Stops the identity listener of the current mount.
    listener_stop: Mutex<Option<CancellationToken>>,
}

impl SpinOrchestrator {
    pub fn new(
        config: WheelConfig,
        catalog_source: Arc<dyn CatalogSource>,
        store: Arc<PersistentDrawStore>,
        session: watch::Receiver<SessionIdentity>,
    ) -> Self {
        let state = Arc::new(WheelState::new());
        let bus = EventBus::new();
        let reconciler = Arc::new(SessionReconciler::new(
            Arc::clone(&state),
            Arc::clone(&store),
            bus.clone(),
        ));
        Self {
            gate: CooldownGate::new(config.cooldown()),
            config,
            catalog_source,
            catalog: RwLock::new(Vec::new()),
            store,
            session,
            state,
            reconciler,
            bus,
            sampler: Arc::new(ThreadRngSampler),
            listener_stop: Mutex::new(None),
        }
    }

    pub fn with_sampler(mut self, sampler: Arc<dyn OffsetSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Await the store, fetch the catalog once, show the current user's view
    /// in `Idle` and start following identity changes. Also re-arms a wheel
    /// that was unmounted before.
    pub async fn mount(&self) {
        self.stop_listener();
        self.state.revive();
        self.store.ready().await;

        let offers = match self.catalog_source.fetch_offers().await {
            Ok(offers) => offers,
            Err(e) => {
                warn!("Catalog fetch failed: {}. The wheel has no offers.", e);
                Vec::new()
            }
        };
        info!("Wheel mounted with {} catalog offer(s)", offers.len());
        *self.catalog.write() = offers;

        let mut identity_rx = self.session.clone();
        let current = identity_rx.borrow_and_update().clone();
        self.reconciler.reload(current).await;

        let stop = CancellationToken::new();
        Arc::clone(&self.reconciler).spawn(identity_rx, stop.clone());
        if let Some(old) = self.listener_stop.lock().replace(stop) {
            old.cancel();
        }
    }

    /// Cancel any running spin without committing it and stop listening for identity changes.
    pub fn unmount(&self) {
        self.state.unmount();
        self.stop_listener();
        debug!("Wheel unmounted");
    }

    fn stop_listener(&self) {
        if let Some(stop) = self.listener_stop.lock().take() {
            stop.cancel();
        }
    }

    /// Spin for the current user. Resolves only after the animation has run
    /// its full duration and the result is persisted.
    pub async fn draw(&self, now: DateTime<Utc>) -> Result<DrawOutcome, DrawError> {
        let result = self.try_draw(now).await;
        match &result {
            Ok(outcome) => {
                info!("Draw committed: offer '{}' at index {}", outcome.offer.id, outcome.index);
            }
            Err(DrawError::AnimationInterrupted) => {
                debug!("Draw aborted before commit");
            }
            Err(reason) => {
                debug!("Draw rejected: {}", reason);
                self.bus.publish(WheelEvent::DrawRejected { reason: reason.clone() });
            }
        }
        result
    }

    async fn try_draw(&self, now: DateTime<Utc>) -> Result<DrawOutcome, DrawError> {
        // Own receiver: every identity notification from here on aborts the spin,
        // even ones the reconciler coalesces away.
        let mut identity_rx = self.session.clone();
        let identity = identity_rx.borrow_and_update().clone();
        let Some(user_id) = identity.user_id().map(str::to_string) else {
            return Err(DrawError::Unauthenticated);
        };

        let claim = self.state.claim(&user_id)?;

        let eligible = eligible_offers(&self.catalog.read(), now);
        if eligible.is_empty() {
            return Err(DrawError::NoEligibleOffers);
        }

        let last_at = self.store.get(&user_id).await.map(|r| r.drawn_at);
        if !self.gate.can_draw(now, last_at) {
            return Err(DrawError::CooldownActive(self.gate.countdown(now, last_at)));
        }

        let offset = sampler::normalize_offset(self.sampler.sample_offset());
        let rotation = spin_rotation(self.config.full_turns, offset);
        let index = map_rotation_to_index(rotation, eligible.len())
            .ok_or(DrawError::NoEligibleOffers)?;
        let offer = eligible[index].clone();

        if !claim.start(rotation) {
            return Err(DrawError::AnimationInterrupted);
        }
        self.bus.publish(WheelEvent::SpinStarted {
            user_id: user_id.clone(),
            rotation,
        });

        tokio::select! {
            _ = tokio::time::sleep(self.config.spin_duration()) => {}
            _ = claim.token().cancelled() => {
                return Err(DrawError::AnimationInterrupted);
            }
            _ = identity_changed(&mut identity_rx) => {
                debug!("Session changed while spinning for '{}'", user_id);
                return Err(DrawError::AnimationInterrupted);
            }
        }

        if claim.is_cancelled() || identity_rx.has_changed().unwrap_or(false) {
            return Err(DrawError::AnimationInterrupted);
        }

        // Commit point: from here on the draw counts even if the session moves on.
        let record = self
            .store
            .put(&user_id, now, &offer)
            .await
            .map_err(|e| DrawError::StoreUnavailable(e.to_string()))?;

        if !claim.reveal(&record) {
            debug!("Session changed during commit for '{}'; result not shown", user_id);
        }
        self.bus.publish(WheelEvent::DrawCommitted {
            user_id,
            offer: offer.clone(),
            drawn_at: record.drawn_at,
        });

        Ok(DrawOutcome {
            code: offer.first_active_code().map(|c| c.code.clone()),
            offer,
            drawn_at: record.drawn_at,
            rotation,
            index,
        })
    }

    pub fn view(&self) -> WheelView {
        self.state.view()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<WheelView> {
        self.state.subscribe()
    }

    /// Event stream for the presentation layer. Events are dropped, not queued
    /// without bound, when the receiver falls `capacity` behind.
    pub fn subscribe_events(&self, capacity: Option<usize>) -> mpsc::Receiver<WheelEvent> {
        self.bus.subscribe(capacity)
    }

    fn last_draw_at(&self) -> Option<DateTime<Utc>> {
        self.state.view().last_record.map(|r| r.drawn_at)
    }

    /// Wait left for the visible user, for the countdown display.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.gate.remaining(now, self.last_draw_at())
    }

    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        self.gate.countdown(now, self.last_draw_at())
    }

    pub fn gate_state(&self, now: DateTime<Utc>) -> GateState {
        self.gate.state(now, self.last_draw_at())
    }

    /// Offers the renderer should paint, in wheel order.
    pub fn eligible(&self, now: DateTime<Utc>) -> Vec<VoucherOffer> {
        eligible_offers(&self.catalog.read(), now)
    }

    /// Painted spans for the current eligible set. Same placement rule the draw uses.
    pub fn layout(&self, now: DateTime<Utc>) -> Vec<(VoucherOffer, SegmentSpan)> {
        let eligible = self.eligible(now);
        let spans = segment_layout(eligible.len());
        eligible.into_iter().zip(spans).collect()
    }

    pub fn reconciler(&self) -> &Arc<SessionReconciler> {
        &self.reconciler
    }

    pub fn store(&self) -> &Arc<PersistentDrawStore> {
        &self.store
    }
}

/// Resolves on the next identity notification. Never resolves once the
/// session source is gone.
async fn identity_changed(rx: &mut watch::Receiver<SessionIdentity>) {
    if rx.changed().await.is_err() {
        std::future::pending::<()>().await;
    }
}

impl Drop for SpinOrchestrator {
    fn drop(&mut self) {
        self.unmount();
    }
}
