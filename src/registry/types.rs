//! Attribute type registry.
//!
//! The registry maps attribute keys to factories and holds the two named
//! dispatch tables. It is populated once during setup, through explicit
//! [`AttributeRegistry::link`] calls, and read-only afterwards.
//!
//! Two queries let the caller gate attribute work entirely:
//! [`linked_type_count`](AttributeRegistry::linked_type_count) (zero means
//! attribute tracking can be skipped) and
//! [`any_motion_reactive_linked`](AttributeRegistry::any_motion_reactive_linked)
//! (false means move propagation can be skipped).

use std::any::Any;

use log::{debug, trace};
use rustc_hash::FxHashMap;
use serde_json::Value;

use super::aggregates::Aggregates;
use super::dispatch::{mismatch, DispatchTable, InstanceFn, Signature, StaticFn};
use crate::attributes::{Attribute, AttributeKey, AttributeType};
use crate::core::{AttributeError, AttributeResult};

/// Builds an attribute instance from its definition value.
pub type AttributeFactory = fn(&Value, &mut Aggregates) -> AttributeResult<Box<dyn Attribute>>;

#[derive(Clone, Copy)]
struct Constructor {
    factory: AttributeFactory,
    motion_reactive: bool,
}

fn build<T: AttributeType>(
    value: &Value,
    aggregates: &mut Aggregates,
) -> AttributeResult<Box<dyn Attribute>> {
    Ok(Box::new(T::from_definition(value, aggregates)?))
}

/// Registry of attribute types and dispatch functions.
///
/// ## Example
///
/// ```
/// use lattice_props::builtin::ColorAttribute;
/// use lattice_props::registry::AttributeRegistry;
///
/// let mut registry = AttributeRegistry::new();
/// assert_eq!(registry.linked_type_count(), 0);
///
/// registry.link::<ColorAttribute>().unwrap();
/// assert_eq!(registry.linked_type_count(), 1);
/// assert!(!registry.any_motion_reactive_linked());
/// ```
#[derive(Default)]
pub struct AttributeRegistry {
    constructors: FxHashMap<AttributeKey, Constructor>,
    static_fns: DispatchTable<StaticFn>,
    instance_fns: DispatchTable<InstanceFn>,
    any_motion_reactive: bool,
}

impl AttributeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in attribute type linked.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::link_builtins(&mut registry)
            .expect("Built-in attribute types have distinct keys and function names");
        registry
    }

    /// Link an attribute type, including any dispatch functions it exposes.
    pub fn link<T: AttributeType>(&mut self) -> AttributeResult<()> {
        T::link(self)
    }

    /// Register the constructor of an attribute type.
    pub fn register_type<T: AttributeType>(&mut self) -> AttributeResult<()> {
        self.register(T::KEY, build::<T>, T::MOTION_REACTIVE)
    }

    /// Register a factory under a key.
    ///
    /// Returns `DuplicateRegistration` if the key is taken; the registry is
    /// left unchanged in that case.
    pub fn register(
        &mut self,
        key: impl Into<AttributeKey>,
        factory: AttributeFactory,
        motion_reactive: bool,
    ) -> AttributeResult<()> {
        let key = key.into();
        if self.constructors.contains_key(&key) {
            return Err(AttributeError::DuplicateRegistration(key));
        }
        debug!("linked attribute type '{key}' (motion-reactive: {motion_reactive})");
        self.constructors.insert(
            key,
            Constructor {
                factory,
                motion_reactive,
            },
        );
        // Monotonic: never cleared once set.
        self.any_motion_reactive |= motion_reactive;
        Ok(())
    }

    /// Register a type-level dispatch function `fn(A) -> R`.
    pub fn register_static_fn<A, R, F>(&mut self, name: impl Into<String>, func: F) -> AttributeResult<()>
    where
        A: Any,
        R: Any,
        F: Fn(&Aggregates, A) -> R + 'static,
    {
        let erased: Box<StaticFn> = Box::new(move |aggregates: &Aggregates, arg: Box<dyn Any>| {
            let arg = arg.downcast::<A>().ok()?;
            Some(Box::new(func(aggregates, *arg)) as Box<dyn Any>)
        });
        self.static_fns.insert(name, Signature::of::<A, R>(), None, erased)
    }

    /// Register an instance-bound dispatch function on attribute type `T`.
    pub fn register_instance_fn<T, A, R, F>(
        &mut self,
        name: impl Into<String>,
        func: F,
    ) -> AttributeResult<()>
    where
        T: AttributeType,
        A: Any,
        R: Any,
        F: Fn(&T, A) -> R + 'static,
    {
        let erased: Box<InstanceFn> = Box::new(move |attribute: &dyn Attribute, arg: Box<dyn Any>| {
            let receiver = attribute.as_any().downcast_ref::<T>()?;
            let arg = arg.downcast::<A>().ok()?;
            Some(Box::new(func(receiver, *arg)) as Box<dyn Any>)
        });
        self.instance_fns
            .insert(name, Signature::of::<A, R>(), Some(T::KEY), erased)
    }

    /// Construct an attribute from its definition value.
    ///
    /// Returns `UnknownAttributeKey` if no factory is registered for `key`.
    pub fn create(
        &self,
        key: &str,
        value: &Value,
        aggregates: &mut Aggregates,
    ) -> AttributeResult<Box<dyn Attribute>> {
        let constructor = self
            .constructors
            .get(key)
            .ok_or_else(|| AttributeError::UnknownAttributeKey(AttributeKey::new(key)))?;
        trace!("constructing attribute '{key}' from {value}");
        (constructor.factory)(value, aggregates)
    }

    /// Invoke a type-level dispatch function with the signature `fn(A) -> R`.
    pub fn call_static<A: Any, R: Any>(
        &self,
        aggregates: &Aggregates,
        name: &str,
        arg: A,
    ) -> AttributeResult<R> {
        let expected = Signature::of::<A, R>();
        let func = self.static_fns.lookup(name, expected)?;
        let result = func(aggregates, Box::new(arg))
            .and_then(|result| result.downcast::<R>().ok())
            .map(|result| *result);
        // `lookup` matched both TypeIds, so neither downcast can fail.
        Ok(result.unwrap_or_else(|| unreachable!("'{name}' rejected its checked {expected}")))
    }

    /// Invoke an instance-bound dispatch function with the signature `fn(A) -> R`.
    ///
    /// Fails with `DispatchTypeMismatch` if `attribute` is not of the type
    /// the function was registered on.
    pub fn call_instance<A: Any, R: Any>(
        &self,
        attribute: &dyn Attribute,
        name: &str,
        arg: A,
    ) -> AttributeResult<R> {
        let expected = Signature::of::<A, R>();
        let func = self.instance_fns.lookup(name, expected)?;
        let receiver = self.instance_fns.receiver(name).unwrap_or_default();
        if receiver != attribute.key() {
            return Err(mismatch(
                name,
                format!("{receiver}::{expected}"),
                format!("{}::{expected}", attribute.key()),
            ));
        }
        // Only fails when a type outside the registry reuses the receiver's key.
        func(attribute, Box::new(arg))
            .and_then(|result| result.downcast::<R>().ok())
            .map(|result| *result)
            .ok_or_else(|| {
                mismatch(
                    name,
                    format!("{receiver}::{expected}"),
                    format!("<unregistered type keyed '{}'>::{expected}", attribute.key()),
                )
            })
    }

    /// Number of distinct attribute types linked.
    #[must_use]
    pub fn linked_type_count(&self) -> usize {
        self.constructors.len()
    }

    /// True once any motion-reactive attribute type has been linked.
    #[must_use]
    pub fn any_motion_reactive_linked(&self) -> bool {
        self.any_motion_reactive
    }

    /// Check if a key has a registered factory.
    #[must_use]
    pub fn is_registered(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Whether the type registered under `key` is motion-reactive.
    #[must_use]
    pub fn is_motion_reactive(&self, key: &str) -> Option<bool> {
        self.constructors.get(key).map(|c| c.motion_reactive)
    }

    /// Iterate over registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &AttributeKey> {
        self.constructors.keys()
    }

    /// Type-level dispatch table.
    #[must_use]
    pub fn static_functions(&self) -> &DispatchTable<StaticFn> {
        &self.static_fns
    }

    /// Instance-bound dispatch table.
    #[must_use]
    pub fn instance_functions(&self) -> &DispatchTable<InstanceFn> {
        &self.instance_fns
    }
}

impl std::fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.constructors.keys().collect();
        keys.sort();
        f.debug_struct("AttributeRegistry")
            .field("types", &keys)
            .field("static_fns", &self.static_fns)
            .field("instance_fns", &self.instance_fns)
            .field("any_motion_reactive", &self.any_motion_reactive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{ColorAttribute, HeadingAttribute};
    use serde_json::json;

    fn fixed_color(_: &Value, _: &mut Aggregates) -> AttributeResult<Box<dyn Attribute>> {
        Ok(Box::new(ColorAttribute::from_packed(0x123456)))
    }

    #[test]
    fn test_empty_registry() {
        let registry = AttributeRegistry::new();
        assert_eq!(registry.linked_type_count(), 0);
        assert!(!registry.any_motion_reactive_linked());
        assert!(!registry.is_registered("color"));
    }

    #[test]
    fn test_motion_flag_is_monotonic() {
        let mut registry = AttributeRegistry::new();
        registry.link::<ColorAttribute>().unwrap();
        assert!(!registry.any_motion_reactive_linked());

        registry.link::<HeadingAttribute>().unwrap();
        assert!(registry.any_motion_reactive_linked());

        registry.register("plain", fixed_color, false).unwrap();
        assert!(registry.any_motion_reactive_linked());
        assert_eq!(registry.linked_type_count(), 3);
        assert_eq!(registry.is_motion_reactive("heading"), Some(true));
        assert_eq!(registry.is_motion_reactive("color"), Some(false));
        assert_eq!(registry.is_motion_reactive("missing"), None);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = AttributeRegistry::new();
        registry.register_type::<ColorAttribute>().unwrap();

        let err = registry.register("color", fixed_color, true).unwrap_err();
        assert_eq!(err, AttributeError::DuplicateRegistration("color".into()));
        assert_eq!(registry.linked_type_count(), 1);
        assert!(!registry.any_motion_reactive_linked());
    }

    #[test]
    fn test_create_unknown_key() {
        let registry = AttributeRegistry::new();
        let mut aggregates = Aggregates::new();
        let err = registry
            .create("unknown-key", &json!(1), &mut aggregates)
            .unwrap_err();
        assert_eq!(err, AttributeError::UnknownAttributeKey("unknown-key".into()));
        assert!(aggregates.is_empty());
    }

    #[test]
    fn test_create_with_raw_factory() {
        let mut registry = AttributeRegistry::new();
        registry.register("fixed", fixed_color, false).unwrap();
        let attribute = registry
            .create("fixed", &Value::Null, &mut Aggregates::new())
            .unwrap();
        assert_eq!(attribute.as_int(), 0x123456);
    }

    #[test]
    fn test_static_dispatch_with_args() {
        let mut registry = AttributeRegistry::new();
        registry
            .register_static_fn("double", |_: &Aggregates, x: i64| x * 2)
            .unwrap();

        let aggregates = Aggregates::new();
        assert_eq!(registry.call_static::<i64, i64>(&aggregates, "double", 21).unwrap(), 42);
        assert!(matches!(
            registry.call_static::<i32, i64>(&aggregates, "double", 21),
            Err(AttributeError::DispatchTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_instance_dispatch_checks_receiver() {
        let mut registry = AttributeRegistry::new();
        registry
            .register_instance_fn("color.raw", |c: &ColorAttribute, (): ()| c.packed())
            .unwrap();

        let red = ColorAttribute::from_packed(0xFF0000);
        assert_eq!(registry.call_instance::<(), u32>(&red, "color.raw", ()).unwrap(), 0xFF0000);

        let heading = HeadingAttribute::new([1, 0]);
        match registry.call_instance::<(), u32>(&heading, "color.raw", ()) {
            Err(AttributeError::DispatchTypeMismatch { registered, requested, .. }) => {
                assert!(registered.starts_with("color::"));
                assert!(requested.starts_with("heading::"));
            }
            other => panic!("expected a receiver mismatch, got {:?}", other.map(|_| ())),
        }
    }

    /// Claims the color key without being the registered color type.
    #[derive(Debug)]
    struct Impostor;

    impl Attribute for Impostor {
        fn key(&self) -> &str {
            "color"
        }

        fn eq_same_type(&self, _other: &dyn Attribute) -> bool {
            true
        }

        fn clone_box(&self) -> Box<dyn Attribute> {
            Box::new(Impostor)
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
    fn test_instance_dispatch_rejects_foreign_type_with_same_key() {
        let registry = AttributeRegistry::with_builtins();
        match registry.call_instance::<(), u32>(&Impostor, "color.value", ()) {
            Err(AttributeError::DispatchTypeMismatch { name, registered, requested }) => {
                assert_eq!(name, "color.value");
                assert_eq!(registered, "color::fn(()) -> u32");
                assert_ne!(registered, requested);
                assert!(requested.contains("unregistered"));
            }
            other => panic!("expected a receiver mismatch, got {:?}", other.map(|_| ())),
        }
    }
}
