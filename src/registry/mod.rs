//! Attribute registry: factories, dispatch tables, and run context.
//!
//! ## Key Types
//!
//! - `AttributeRegistry`: key → factory map plus the dispatch tables
//! - `DispatchTable`: name → typed, type-erased function
//! - `Aggregates`: run-wide side tables (the color palette)
//! - `AttributeContext`: registry and aggregates for one run

pub mod aggregates;
pub mod context;
pub mod dispatch;
pub mod types;

pub use aggregates::Aggregates;
pub use context::AttributeContext;
pub use dispatch::{DispatchTable, InstanceFn, Signature, StaticFn, TypeTag};
pub use types::{AttributeFactory, AttributeRegistry};
