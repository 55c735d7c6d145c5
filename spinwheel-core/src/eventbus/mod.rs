//! src/eventbus/mod.rs
//!
//! Fan-out of wheel events to the presentation layer.
//!
//! Publishing never waits on a subscriber. A reader that stopped draining
//! loses events; the wheel keeps going.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use spinwheel_common::models::{DrawRecord, SessionIdentity, VoucherOffer};
use spinwheel_common::DrawError;

/// Discrete things that happened to the wheel.
#[derive(Debug, Clone)]
pub enum WheelEvent {
    /// Animation began towards `rotation` degrees.
    SpinStarted { user_id: String, rotation: f64 },

    /// The draw was persisted and may now be revealed.
    DrawCommitted {
        user_id: String,
        offer: VoucherOffer,
        drawn_at: DateTime<Utc>,
    },

    /// A draw request was refused or aborted.
    DrawRejected { reason: DrawError },

    /// The view was reloaded for a newly observed user.
    ViewReloaded {
        identity: SessionIdentity,
        record: Option<DrawRecord>,
    },

    /// The user logged out; the visible result was cleared.
    ViewCleared,
}

impl WheelEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            WheelEvent::SpinStarted { .. } => "spin.started",
            WheelEvent::DrawCommitted { .. } => "draw.committed",
            WheelEvent::DrawRejected { .. } => "draw.rejected",
            WheelEvent::ViewReloaded { .. } => "view.reloaded",
            WheelEvent::ViewCleared => "view.cleared",
        }
    }
}

/// Cloneable handle; clones share the subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<WheelEvent>>>>,
    dropped: Arc<AtomicU64>,
}

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// New receiver holding at most `capacity` undelivered events.
    pub fn subscribe(&self, capacity: Option<usize>) -> mpsc::Receiver<WheelEvent> {
        let (tx, rx) = mpsc::channel(capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY).max(1));
        self.subscribers.lock().push(tx);
        rx
    }

    /// Offer `event` to every subscriber without waiting. A full queue loses
    /// the event; a closed one is removed. Returns how many queues took it.
    pub fn publish(&self, event: WheelEvent) -> usize {
        let mut delivered = 0;
        self.subscribers.lock().retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Wheel event '{}' dropped: subscriber queue full", event.event_type());
                true
            }
            Err(TrySendError::Closed(_)) => false,
        });
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Events lost to full subscriber queues since creation.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
