// ================================================================
// File: spinwheel-common/src/error.rs
// ================================================================

use thiserror::Error;

use crate::models::countdown::Countdown;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

/// Typed outcome of a rejected or aborted draw.
///
/// Every variant except `StoreUnavailable` is ordinary control flow and is
/// never logged above `debug`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("a user must be logged in to spin the wheel")]
    Unauthenticated,

    #[error("no voucher offers are currently eligible")]
    NoEligibleOffers,

    #[error("cooldown active, {0} remaining")]
    CooldownActive(Countdown),

    #[error("a spin is already in progress")]
    AlreadySpinning,

    #[error("draw store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("spin animation interrupted")]
    AnimationInterrupted,
}

impl DrawError {
    /// Message shown to the user. `AnimationInterrupted` is a silent abort.
    pub fn user_message(&self) -> Option<String> {
        match self {
            DrawError::Unauthenticated => {
                Some("Please log in to your account to spin the lucky wheel.".to_string())
            }
            DrawError::NoEligibleOffers => {
                Some("There are no vouchers available to win right now. Please check back later.".to_string())
            }
            DrawError::CooldownActive(left) => Some(format!(
                "You have already spun the wheel. You can spin again in {}.",
                left
            )),
            DrawError::AlreadySpinning => {
                Some("The wheel is already spinning. Please wait for the result.".to_string())
            }
            DrawError::StoreUnavailable(_) => {
                Some("Your spin could not be saved. Please try again in a moment.".to_string())
            }
            DrawError::AnimationInterrupted => None,
        }
    }
}
