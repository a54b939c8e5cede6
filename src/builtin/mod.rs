//! Built-in attribute types.
//!
//! - `color` ([`ColorAttribute`]): packed RGB value plus the run palette
//! - `heading` ([`HeadingAttribute`]): motion-reactive direction of travel
//!
//! Each type links itself through
//! [`AttributeType::link`](crate::attributes::AttributeType::link); this module only
//! offers the convenience of linking all of them at once.

pub mod color;
pub mod heading;

pub use color::{ColorAttribute, Palette, COLOR_KEY};
pub use heading::{HeadingAttribute, HEADING_KEY};

use crate::core::AttributeResult;
use crate::registry::AttributeRegistry;

/// Link every built-in attribute type into `registry`.
pub fn link_builtins(registry: &mut AttributeRegistry) -> AttributeResult<()> {
    registry.link::<ColorAttribute>()?;
    registry.link::<HeadingAttribute>()
}
