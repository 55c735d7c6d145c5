// src/session/mod.rs
//
// Keeps the wheel view in step with identity changes that happen outside
// the wheel (logout in another tab, account switch).

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use spinwheel_common::models::SessionIdentity;

use crate::eventbus::{EventBus, WheelEvent};
use crate::state::WheelState;
use crate::store::PersistentDrawStore;

/// The session source's side of the identity channel.
pub struct SessionHandle {
    tx: watch::Sender<SessionIdentity>,
}

impl SessionHandle {
    pub fn new(initial: SessionIdentity) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn login(&self, user_id: &str) {
        self.set(SessionIdentity::from_user_id(Some(user_id)));
    }

    pub fn logout(&self) {
        self.set(SessionIdentity::Anonymous);
    }

    /// Always notifies subscribers, even when the identity is unchanged.
    pub fn set(&self, identity: SessionIdentity) {
        self.tx.send_replace(identity);
    }

    pub fn current(&self) -> SessionIdentity {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionIdentity> {
        self.tx.subscribe()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new(SessionIdentity::Anonymous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Unchanged,
    /// Logged out: spin and visible result cleared, persisted record kept.
    Cleared,
    /// New user: view reloaded from that user's persisted record.
    Reloaded,
}

pub struct SessionReconciler {
    state: Arc<WheelState>,
    store: Arc<PersistentDrawStore>,
    bus: EventBus,
    /// `None` until the first identity is observed at mount.
    observed: Mutex<Option<SessionIdentity>>,
}

impl SessionReconciler {
    pub fn new(state: Arc<WheelState>, store: Arc<PersistentDrawStore>, bus: EventBus) -> Self {
        Self {
            state,
            store,
            bus,
            observed: Mutex::new(None),
        }
    }

    /// Apply `identity`. Repeating the same identity is a no-op, and a spin
    /// already running for that same user is left alone.
    pub async fn reconcile(&self, identity: SessionIdentity) -> ReconcileAction {
        let event = {
            let mut observed = self.observed.lock().await;
            if observed.as_ref() == Some(&identity) {
                return ReconcileAction::Unchanged;
            }
            let event = self.apply(&identity, false).await;
            *observed = Some(identity);
            event
        };
        self.finish(event)
    }

    /// Unconditionally rebuild the view for `identity` in `Idle`. Used on mount.
    pub async fn reload(&self, identity: SessionIdentity) -> ReconcileAction {
        let event = {
            let mut observed = self.observed.lock().await;
            let event = self.apply(&identity, true).await;
            *observed = Some(identity);
            event
        };
        self.finish(event)
    }

    async fn apply(&self, identity: &SessionIdentity, hard: bool) -> WheelEvent {
        let Some(user_id) = identity.user_id() else {
            if let Some(user) = self.state.cancel_in_flight() {
                debug!("Logout while spinning for '{}'; spin cancelled", user);
            }
            self.state.reset(SessionIdentity::Anonymous, None);
            info!("Session ended; wheel view cleared.");
            return WheelEvent::ViewCleared;
        };

        let record = self.store.get(user_id).await;
        if hard {
            if let Some(prev) = self.state.cancel_in_flight() {
                debug!("Wheel reloaded while spinning for '{}'; spin cancelled", prev);
            }
            self.state.reset(identity.clone(), record.clone());
        } else {
            if let Some(prev) = self.state.cancel_in_flight_unless(user_id) {
                debug!("Identity changed while spinning for '{}'; spin cancelled", prev);
            }
            self.state.switch_to(identity.clone(), record.clone());
        }
        info!(
            "Wheel view reloaded for user '{}' (has previous draw: {})",
            user_id,
            record.is_some()
        );
        WheelEvent::ViewReloaded {
            identity: identity.clone(),
            record,
        }
    }

    fn finish(&self, event: WheelEvent) -> ReconcileAction {
        let action = match event {
            WheelEvent::ViewCleared => ReconcileAction::Cleared,
            _ => ReconcileAction::Reloaded,
        };
        self.bus.publish(event);
        action
    }

    /// Reconcile on every identity notification until `stop` fires or the
    /// session source goes away.
    pub fn spawn(
        self: Arc<Self>,
        mut identity_rx: watch::Receiver<SessionIdentity>,
        stop: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        debug!("Reconciler stopped.");
                        break;
                    }
                    changed = identity_rx.changed() => {
                        if changed.is_err() {
                            debug!("Session source closed; reconciler stopping.");
                            break;
                        }
                        let identity = identity_rx.borrow_and_update().clone();
                        self.reconcile(identity).await;
                    }
                }
            }
        })
    }
}
