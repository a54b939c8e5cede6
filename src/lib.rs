//! # lattice-props
//!
//! Extensible per-module attributes for modular robot lattice search.
//!
//! Modules in a reconfiguration lattice carry attributes beyond their
//! coordinate (color, heading, ...). This crate lets attribute types be
//! declared independently, built from declarative definitions, compared and
//! hashed for search-state deduplication, and updated when modules move,
//! without the lattice or search code knowing any concrete attribute type.
//!
//! ## Design Principles
//!
//! 1. **Explicit Context**: The registry and run-wide aggregates live in an
//!    `AttributeContext` owned by the caller. No process globals.
//!
//! 2. **Explicit Linking**: Each attribute type contributes itself through
//!    `AttributeRegistry::link::<T>()`; there is no central list of types.
//!
//! 3. **Typed Dispatch**: Named functions carry their signature, and calls
//!    with the wrong signature fail with an error instead of a bad cast.
//!
//! ## Modules
//!
//! - `core`: Errors, move deltas, tracking configuration
//! - `attributes`: Attribute contracts, definitions, per-module sets
//! - `registry`: Type registry, dispatch tables, aggregates, run context
//! - `builtin`: Color and heading attributes

pub mod core;
pub mod attributes;
pub mod registry;
pub mod builtin;

// Re-export commonly used types
pub use crate::core::{
    AttributeError, AttributeResult, MoveDelta,
    SkipReason, TrackingConfig, TrackingPlan,
};

pub use crate::attributes::{
    Attribute, AttributeDefinition, AttributeKey, AttributeSet, AttributeType, MotionAttribute,
};

pub use crate::registry::{
    Aggregates, AttributeContext, AttributeFactory, AttributeRegistry, DispatchTable, Signature,
};

pub use crate::builtin::{ColorAttribute, HeadingAttribute, Palette};
