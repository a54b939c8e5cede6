//! Registry integration tests.
//!
//! Includes an attribute type defined outside the crate, linked the same
//! way the built-ins are.

use std::any::Any;

use lattice_props::attributes::{
    same_type, stable_hash, Attribute, AttributeDefinition, AttributeSet, AttributeType,
    MotionAttribute,
};
use lattice_props::core::{AttributeError, AttributeResult, MoveDelta};
use lattice_props::registry::{Aggregates, AttributeContext, AttributeRegistry};
use serde_json::{json, Value};

/// Counts how many moves its module has made.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Odometer {
    moves: u32,
}

impl Attribute for Odometer {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn eq_same_type(&self, other: &dyn Attribute) -> bool {
        self == same_type(self, other)
    }

    fn clone_box(&self) -> Box<dyn Attribute> {
        Box::new(self.clone())
    }

    fn attribute_hash(&self) -> u64 {
        stable_hash(&self.moves)
    }

    fn as_int(&self) -> u64 {
        u64::from(self.moves)
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

impl MotionAttribute for Odometer {
    fn on_move(&mut self, _delta: &MoveDelta) {
        self.moves += 1;
    }
}

impl AttributeType for Odometer {
    const KEY: &'static str = "odometer";
    const MOTION_REACTIVE: bool = true;

    fn from_definition(value: &Value, _aggregates: &mut Aggregates) -> AttributeResult<Self> {
        let moves = value
            .as_u64()
            .and_then(|m| u32::try_from(m).ok())
            .ok_or_else(|| AttributeError::malformed(Self::KEY, "expected a move count"))?;
        Ok(Self { moves })
    }
}

#[test]
fn test_linked_counts() {
    let mut registry = AttributeRegistry::new();
    assert_eq!(registry.linked_type_count(), 0);
    assert!(!registry.any_motion_reactive_linked());

    lattice_props::builtin::link_builtins(&mut registry).unwrap();
    assert_eq!(registry.linked_type_count(), 2);
    assert!(registry.any_motion_reactive_linked());

    registry.link::<Odometer>().unwrap();
    assert_eq!(registry.linked_type_count(), 3);

    let mut keys: Vec<_> = registry.keys().map(|k| k.as_str().to_string()).collect();
    keys.sort();
    assert_eq!(keys, vec!["color", "heading", "odometer"]);
}

#[test]
fn test_relinking_rejected() {
    let mut registry = AttributeRegistry::with_builtins();
    let err = registry.link::<lattice_props::ColorAttribute>().unwrap_err();
    assert_eq!(err, AttributeError::DuplicateRegistration("color".into()));
    assert_eq!(registry.linked_type_count(), 2);
}

#[test]
fn test_external_type_in_sets() {
    let mut registry = AttributeRegistry::new();
    registry.link::<Odometer>().unwrap();
    let mut ctx = AttributeContext::new(registry);

    let def = AttributeDefinition::new().with_attr("odometer", 0);
    let mut set = AttributeSet::from_definition(&mut ctx, &def).unwrap();
    let snapshot = set.clone();

    set.propagate(&MoveDelta::from([1, 0, 0]));
    set.propagate(&MoveDelta::from([0, 1, 0]));

    assert_eq!(set.get_as::<Odometer>("odometer").unwrap().moves, 2);
    assert_eq!(snapshot.get_as::<Odometer>("odometer").unwrap().moves, 0);
    assert_ne!(set, snapshot);
}

#[test]
fn test_external_type_malformed() {
    let mut registry = AttributeRegistry::new();
    registry.link::<Odometer>().unwrap();
    let mut ctx = AttributeContext::new(registry);

    let err = ctx.create("odometer", &json!("many")).unwrap_err();
    assert_eq!(
        err,
        AttributeError::MalformedDefinition {
            key: "odometer".into(),
            reason: "expected a move count".into(),
        }
    );
}

#[test]
fn test_unknown_key_in_empty_registry() {
    let mut ctx = AttributeContext::new(AttributeRegistry::new());
    assert_eq!(
        ctx.create("unknown-key", &json!([1, 2, 3])).unwrap_err(),
        AttributeError::UnknownAttributeKey("unknown-key".into())
    );
}

#[test]
#[should_panic(expected = "matching types")]
fn test_cross_type_comparison_is_a_defect() {
    let mut ctx = AttributeContext::with_builtins();
    let color = ctx.create("color", &json!("red")).unwrap();
    let heading = ctx.create("heading", &json!([1, 0])).unwrap();
    color.eq_same_type(heading.as_ref());
}
