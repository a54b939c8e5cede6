//! Attribute contracts.
//!
//! [`Attribute`] is the object-safe interface every concrete attribute type
//! implements so that an [`AttributeSet`](super::AttributeSet) can hold them
//! behind `Box<dyn Attribute>`. [`MotionAttribute`] adds the move hook for
//! attributes whose value follows the owning module's motion.
//!
//! [`AttributeType`] is the static side of the contract: the key, the
//! construction function, and the explicit link step that contributes the
//! type to an [`AttributeRegistry`].

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde_json::Value;

use crate::core::{AttributeResult, MoveDelta};
use crate::registry::{Aggregates, AttributeRegistry};

/// A typed, named value attached to a module.
///
/// ## Value semantics
///
/// - `eq_same_type` compares against another instance of the *same* concrete
///   type. Passing a different type is a defect and panics.
/// - `clone_box` is a deep copy; the clone never shares mutable state.
/// - `attribute_hash` is stable: equal values give equal hashes.
/// - `as_int` is a lossy 64-bit encoding for packing into composite keys.
pub trait Attribute: Any + fmt::Debug {
    /// Key of this attribute's type.
    fn key(&self) -> &str;

    /// Compare with another instance of the same concrete type.
    fn eq_same_type(&self, other: &dyn Attribute) -> bool;

    /// Deep copy into a new box.
    fn clone_box(&self) -> Box<dyn Attribute>;

    /// Stable hash of the logical value.
    fn attribute_hash(&self) -> u64;

    /// Compact integer encoding.
    fn as_int(&self) -> u64;

    /// Upcast for checked downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The motion-reactive view of this attribute, if it has one.
    fn as_motion(&self) -> Option<&dyn MotionAttribute> {
        None
    }

    /// Mutable motion-reactive view, used for move propagation.
    fn as_motion_mut(&mut self) -> Option<&mut dyn MotionAttribute> {
        None
    }
}

/// An attribute whose state changes when its owning module moves.
pub trait MotionAttribute: Attribute {
    /// React to a move of the owning module.
    ///
    /// Called once per move. Reacting to neighbouring modules' moves is up
    /// to the lattice layer, which decides on which modules to call this.
    fn on_move(&mut self, delta: &MoveDelta);
}

impl Clone for Box<dyn Attribute> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Static half of the attribute contract, used for registration.
pub trait AttributeType: Attribute + Sized {
    /// Key under which this type is registered.
    const KEY: &'static str;

    /// Whether instances implement [`MotionAttribute`].
    const MOTION_REACTIVE: bool = false;

    /// Construct an instance from its declarative definition value.
    ///
    /// `aggregates` gives access to run-wide side tables (e.g. the palette).
    fn from_definition(value: &Value, aggregates: &mut Aggregates) -> AttributeResult<Self>;

    /// Contribute this type to a registry.
    ///
    /// Types that expose dispatch functions override this to register them
    /// alongside the constructor.
    fn link(registry: &mut AttributeRegistry) -> AttributeResult<()> {
        registry.register_type::<Self>()
    }
}

/// Downcast `other` to the concrete type of `this`.
///
/// Panics when the types differ: comparing attributes of different types is
/// a contract violation, not a legitimate inequality.
pub fn same_type<'a, T: Attribute>(this: &T, other: &'a dyn Attribute) -> &'a T {
    match other.as_any().downcast_ref::<T>() {
        Some(other) => other,
        None => panic!(
            "Attribute comparison requires matching types: '{}' vs '{}'",
            this.key(),
            other.key()
        ),
    }
}

/// Stable 64-bit hash of a value using `FxHasher`.
#[must_use]
pub fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Weight(u32);

    impl Attribute for Weight {
        fn key(&self) -> &str {
            "weight"
        }

        fn eq_same_type(&self, other: &dyn Attribute) -> bool {
            self == same_type(self, other)
        }

        fn clone_box(&self) -> Box<dyn Attribute> {
            Box::new(self.clone())
        }

        fn attribute_hash(&self) -> u64 {
            stable_hash(self)
        }

        fn as_int(&self) -> u64 {
            u64::from(self.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Clone, Debug)]
    struct Label;

    impl Attribute for Label {
        fn key(&self) -> &str {
            "label"
        }

        fn eq_same_type(&self, other: &dyn Attribute) -> bool {
            same_type(self, other);
            true
        }

        fn clone_box(&self) -> Box<dyn Attribute> {
            Box::new(self.clone())
        }

        fn attribute_hash(&self) -> u64 {
            0
        }

        fn as_int(&self) -> u64 {
            0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_eq_same_type() {
        let a: Box<dyn Attribute> = Box::new(Weight(3));
        let b: Box<dyn Attribute> = Box::new(Weight(3));
        let c: Box<dyn Attribute> = Box::new(Weight(4));

        assert!(a.eq_same_type(b.as_ref()));
        assert!(!a.eq_same_type(c.as_ref()));
        assert_eq!(a.attribute_hash(), b.attribute_hash());
    }

    #[test]
    #[should_panic(expected = "matching types: 'weight' vs 'label'")]
    fn test_mismatched_types_panic() {
        let a: Box<dyn Attribute> = Box::new(Weight(3));
        let b: Box<dyn Attribute> = Box::new(Label);
        a.eq_same_type(b.as_ref());
    }

    #[test]
    fn test_box_clone_is_deep() {
        let a: Box<dyn Attribute> = Box::new(Weight(7));
        let b = a.clone();
        assert!(a.eq_same_type(b.as_ref()));
        assert_eq!(b.as_int(), 7);
        assert!(b.as_motion().is_none());
    }

    #[test]
    fn test_stable_hash_is_deterministic() {
        assert_eq!(stable_hash(&42u32), stable_hash(&42u32));
        assert_ne!(stable_hash(&42u32), stable_hash(&43u32));
    }
}
