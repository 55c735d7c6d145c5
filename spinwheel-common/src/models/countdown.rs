// File: spinwheel-common/src/models/countdown.rs

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Remaining wait split into display units. Each unit is truncated, never rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Negative durations clamp to zero.
    pub fn from_duration(d: Duration) -> Self {
        let total = d.num_seconds().max(0);
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

impl From<Duration> for Countdown {
    fn from(d: Duration) -> Self {
        Countdown::from_duration(d)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}
