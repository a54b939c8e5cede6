//! Attribute system: keys, contracts, definitions, and per-module sets.
//!
//! ## Key Types
//!
//! - `AttributeKey`: Names an attribute type
//! - `Attribute`: Object-safe value contract (equality, clone, hash, encoding)
//! - `MotionAttribute`: Attributes that react to their module's moves
//! - `AttributeType`: Static registration contract
//! - `AttributeDefinition`: Declarative `key → value` entries
//! - `AttributeSet`: The attributes owned by one module

pub mod definition;
pub mod key;
pub mod set;
pub mod traits;

pub use definition::AttributeDefinition;
pub use key::AttributeKey;
pub use set::AttributeSet;
pub use traits::{same_type, stable_hash, Attribute, AttributeType, MotionAttribute};
