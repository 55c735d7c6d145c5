// spinwheel-common/src/lib.rs

pub mod error;
pub mod models;
pub mod traits;

pub use error::{DrawError, Error};
