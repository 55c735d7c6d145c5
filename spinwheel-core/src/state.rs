// src/state.rs
//
// Shared, observable wheel view plus the single in-flight spin slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use spinwheel_common::models::{DrawRecord, SessionIdentity, SpinState};
use spinwheel_common::DrawError;

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WheelView {
    pub identity: SessionIdentity,
    pub spin: SpinState,
    /// Persisted result of the current user, used for the result panel and countdown.
    pub last_record: Option<DrawRecord>,
}

struct InFlight {
    id: u64,
    user_id: String,
    token: CancellationToken,
}

impl InFlight {
    fn is_live_for(&self, user_id: &str) -> bool {
        self.user_id == user_id && !self.token.is_cancelled()
    }
}

pub struct WheelState {
    view_tx: watch::Sender<WheelView>,
    in_flight: Mutex<Option<InFlight>>,
    next_id: AtomicU64,
    /// Parent of every spin token. Cancelled on unmount, replaced on the next mount.
    lifetime: Mutex<CancellationToken>,
}

impl WheelState {
    pub fn new() -> Self {
        let (view_tx, _) = watch::channel(WheelView::default());
        Self {
            view_tx,
            in_flight: Mutex::new(None),
            next_id: AtomicU64::new(1),
            lifetime: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WheelView> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> WheelView {
        self.view_tx.borrow().clone()
    }

    pub fn is_unmounted(&self) -> bool {
        self.lifetime.lock().is_cancelled()
    }

    /// Reserve the spin slot for `user_id`. At most one spin runs at a time.
    pub fn claim(self: &Arc<Self>, user_id: &str) -> Result<SpinClaim, DrawError> {
        let token = {
            let lifetime = self.lifetime.lock();
            if lifetime.is_cancelled() {
                return Err(DrawError::AnimationInterrupted);
            }
            lifetime.child_token()
        };
        let mut slot = self.in_flight.lock();
        if slot.is_some() {
            return Err(DrawError::AlreadySpinning);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        *slot = Some(InFlight {
            id,
            user_id: user_id.to_string(),
            token: token.clone(),
        });
        Ok(SpinClaim {
            state: Arc::clone(self),
            id,
            token,
        })
    }

    /// Cancel the running spin, if any. Returns the user it belonged to.
    pub fn cancel_in_flight(&self) -> Option<String> {
        let taken = self.in_flight.lock().take()?;
        taken.token.cancel();
        Some(taken.user_id)
    }

    /// Cancel the running spin unless it belongs to `user_id`.
    pub fn cancel_in_flight_unless(&self, user_id: &str) -> Option<String> {
        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|f| f.user_id == user_id) {
            return None;
        }
        let taken = slot.take()?;
        taken.token.cancel();
        Some(taken.user_id)
    }

    /// Back to `Idle` for `identity`, showing `record` as the last result.
    pub fn reset(&self, identity: SessionIdentity, record: Option<DrawRecord>) {
        let _slot = self.in_flight.lock();
        self.view_tx.send_replace(WheelView {
            identity,
            spin: SpinState::Idle,
            last_record: record,
        });
    }

    /// Show `identity` with its persisted `record`, keeping a spin or result
    /// that already belongs to that user. Anonymous identities always reset.
    pub fn switch_to(&self, identity: SessionIdentity, record: Option<DrawRecord>) {
        let Some(user_id) = identity.user_id().map(str::to_string) else {
            self.reset(identity, None);
            return;
        };
        let slot = self.in_flight.lock();
        let spinning_for_user = slot.as_ref().is_some_and(|f| f.is_live_for(&user_id));
        self.view_tx.send_modify(|view| {
            let shown = view
                .last_record
                .take()
                .filter(|r| r.user_id == user_id);
            let fresher_shown = match (&shown, &record) {
                (Some(s), Some(r)) => s.drawn_at >= r.drawn_at,
                (Some(_), None) => true,
                _ => false,
            };
            let keep_spin = match view.spin {
                SpinState::Spinning { .. } => spinning_for_user,
                SpinState::Result(_) => fresher_shown,
                SpinState::Idle => false,
            };
            if !keep_spin {
                view.spin = SpinState::Idle;
            }
            view.last_record = if fresher_shown { shown } else { record };
            view.identity = identity;
        });
    }

    /// Tear down: cancel any spin and refuse new ones until `revive`.
    pub fn unmount(&self) {
        self.cancel_in_flight();
        self.lifetime.lock().cancel();
    }

    /// Accept spins again after an `unmount`.
    pub fn revive(&self) {
        let mut lifetime = self.lifetime.lock();
        if lifetime.is_cancelled() {
            *lifetime = CancellationToken::new();
        }
    }
}

impl Default for WheelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Ownership of the spin slot for one draw. Dropping it frees the slot and
/// returns a still-spinning wheel to `Idle`.
pub struct SpinClaim {
    state: Arc<WheelState>,
    id: u64,
    token: CancellationToken,
}

impl SpinClaim {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn is_current(&self, slot: &Option<InFlight>) -> bool {
        slot.as_ref().is_some_and(|f| f.id == self.id) && !self.token.is_cancelled()
    }

    /// Show the wheel spinning towards `rotation`. False if the claim was cancelled.
    pub fn start(&self, rotation: f64) -> bool {
        let slot = self.state.in_flight.lock();
        if !self.is_current(&slot) {
            return false;
        }
        self.state.view_tx.send_modify(|view| {
            view.spin = SpinState::Spinning { rotation };
        });
        true
    }

    /// Reveal the committed result. False if the session moved on meanwhile.
    pub fn reveal(&self, record: &DrawRecord) -> bool {
        let slot = self.state.in_flight.lock();
        if !self.is_current(&slot) {
            return false;
        }
        self.state.view_tx.send_modify(|view| {
            view.spin = SpinState::Result(record.offer.clone());
            view.last_record = Some(record.clone());
        });
        true
    }
}

impl Drop for SpinClaim {
    fn drop(&mut self) {
        let mut slot = self.state.in_flight.lock();
        if matches!(&*slot, Some(f) if f.id == self.id) {
            *slot = None;
            self.state.view_tx.send_if_modified(|view| {
                if view.spin.is_spinning() {
                    view.spin = SpinState::Idle;
                    true
                } else {
                    false
                }
            });
        }
    }
}
