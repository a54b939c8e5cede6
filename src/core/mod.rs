//! Core types shared by every module: errors, move deltas, configuration.

pub mod config;
pub mod delta;
pub mod error;

pub use config::{SkipReason, TrackingConfig, TrackingPlan};
pub use delta::MoveDelta;
pub use error::{AttributeError, AttributeResult};
