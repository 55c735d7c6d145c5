// src/cooldown.rs

use chrono::{DateTime, Duration, Utc};
use spinwheel_common::models::Countdown;

/// Whether a user may spin right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Ready,
    Waiting(Duration),
}

/// Time gate between two committed draws of the same user.
#[derive(Debug, Clone, Copy)]
pub struct CooldownGate {
    cooldown: Duration,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// True when the user never drew, or the full cooldown has elapsed.
    pub fn can_draw(&self, now: DateTime<Utc>, last_draw: Option<DateTime<Utc>>) -> bool {
        match last_draw {
            None => true,
            Some(last) => now - last >= self.cooldown,
        }
    }

    /// `max(0, cooldown - (now - last))`, capped at `cooldown` when `last` lies in the future.
    pub fn remaining(&self, now: DateTime<Utc>, last_draw: Option<DateTime<Utc>>) -> Duration {
        let Some(last) = last_draw else {
            return Duration::zero();
        };
        let elapsed = (now - last).max(Duration::zero());
        (self.cooldown - elapsed).max(Duration::zero())
    }

    pub fn countdown(&self, now: DateTime<Utc>, last_draw: Option<DateTime<Utc>>) -> Countdown {
        Countdown::from_duration(self.remaining(now, last_draw))
    }

    pub fn state(&self, now: DateTime<Utc>, last_draw: Option<DateTime<Utc>>) -> GateState {
        if self.can_draw(now, last_draw) {
            GateState::Ready
        } else {
            GateState::Waiting(self.remaining(now, last_draw))
        }
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}
