//! Heading attribute: the direction a module last moved in.
//!
//! Definition value is an array of integer axis components, e.g. `[1, 0]`.
//! Components are normalised to their sign. After each move of the owning
//! module the heading becomes the sign of the move's displacement; a zero
//! displacement leaves it unchanged.

use std::any::Any;

use serde_json::Value;
use smallvec::SmallVec;

use crate::attributes::{same_type, stable_hash, Attribute, AttributeType, MotionAttribute};
use crate::core::{AttributeError, AttributeResult, MoveDelta};
use crate::registry::{Aggregates, AttributeRegistry};

/// Registry key of the heading attribute.
pub const HEADING_KEY: &str = "heading";

/// Instance function returning the heading components.
pub const AXES_FN: &str = "heading.axes";

/// Direction of a module's most recent move.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeadingAttribute {
    axes: SmallVec<[i32; 3]>,
}

impl HeadingAttribute {
    /// Create a heading from axis components (normalised to their sign).
    pub fn new(axes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            axes: axes.into_iter().map(i32::signum).collect(),
        }
    }

    /// Heading components, each -1, 0 or 1.
    #[must_use]
    pub fn axes(&self) -> &[i32] {
        &self.axes
    }
}

impl Attribute for HeadingAttribute {
    fn key(&self) -> &str {
        HEADING_KEY
    }

    fn eq_same_type(&self, other: &dyn Attribute) -> bool {
        self.axes == same_type(self, other).axes
    }

    fn clone_box(&self) -> Box<dyn Attribute> {
        Box::new(self.clone())
    }

    fn attribute_hash(&self) -> u64 {
        stable_hash(self.axes.as_slice())
    }

    /// Base-3 digits per axis (0 → 0, 1 → 1, -1 → 2), first axis most significant.
    fn as_int(&self) -> u64 {
        self.axes.iter().fold(0u64, |acc, &axis| {
            let digit = match axis {
                1 => 1,
                -1 => 2,
                _ => 0,
            };
            acc.wrapping_mul(3).wrapping_add(digit)
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_motion(&self) -> Option<&dyn MotionAttribute> {
        Some(self)
    }

    fn as_motion_mut(&mut self) -> Option<&mut dyn MotionAttribute> {
        Some(self)
    }
}

impl MotionAttribute for HeadingAttribute {
    fn on_move(&mut self, delta: &MoveDelta) {
        if !delta.is_zero() {
            self.axes = delta.signum().components().iter().copied().collect();
        }
    }
}

impl AttributeType for HeadingAttribute {
    const KEY: &'static str = HEADING_KEY;
    const MOTION_REACTIVE: bool = true;

    fn from_definition(value: &Value, _aggregates: &mut Aggregates) -> AttributeResult<Self> {
        let components = value
            .as_array()
            .filter(|axes| !axes.is_empty())
            .ok_or_else(|| AttributeError::malformed(HEADING_KEY, "expected a non-empty array"))?;
        let axes = components
            .iter()
            .map(|axis| {
                axis.as_i64()
                    .and_then(|a| i32::try_from(a).ok())
                    .ok_or_else(|| {
                        AttributeError::malformed(HEADING_KEY, format!("invalid axis {axis}"))
                    })
            })
            .collect::<AttributeResult<Vec<_>>>()?;
        Ok(Self::new(axes))
    }

    fn link(registry: &mut AttributeRegistry) -> AttributeResult<()> {
        registry.register_type::<Self>()?;
        registry.register_instance_fn(AXES_FN, |heading: &Self, (): ()| heading.axes.to_vec())
    }
}
