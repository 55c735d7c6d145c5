// src/lib.rs

pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod db;
pub mod eligibility;
pub mod eventbus;
pub mod repositories;
pub mod segment;
pub mod session;
pub mod spin;
pub mod state;
pub mod store;

pub use config::WheelConfig;
pub use db::Database;
pub use spin::{DrawOutcome, SpinOrchestrator};
pub use spinwheel_common::error::{DrawError, Error};
