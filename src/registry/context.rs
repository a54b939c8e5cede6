//! Per-run attribute context.
//!
//! `AttributeContext` bundles the registry with the run-wide aggregates.
//! The top-level caller creates one per search run (or per test) and drops
//! it when the run ends; nothing in the crate is process-global.

use std::any::Any;

use serde_json::Value;

use super::aggregates::Aggregates;
use super::types::AttributeRegistry;
use crate::attributes::Attribute;
use crate::core::AttributeResult;

/// Registry plus run-wide aggregates.
///
/// ## Example
///
/// ```
/// use lattice_props::registry::AttributeContext;
/// use serde_json::json;
///
/// let mut ctx = AttributeContext::with_builtins();
/// let red = ctx.create("color", &json!("red")).unwrap();
///
/// let value: u32 = ctx.call_on(red.as_ref(), "color.value").unwrap();
/// assert_eq!(value, 0xFF0000);
///
/// let palette_size: usize = ctx.call("color.palette_size").unwrap();
/// assert_eq!(palette_size, 1);
/// ```
#[derive(Debug, Default)]
pub struct AttributeContext {
    registry: AttributeRegistry,
    aggregates: Aggregates,
}

impl AttributeContext {
    /// Create a context around a populated registry.
    #[must_use]
    pub fn new(registry: AttributeRegistry) -> Self {
        Self {
            registry,
            aggregates: Aggregates::new(),
        }
    }

    /// Create a context with every built-in attribute type linked.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new(AttributeRegistry::with_builtins())
    }

    /// The attribute registry.
    #[must_use]
    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Run-wide aggregates.
    #[must_use]
    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    /// Mutable run-wide aggregates.
    pub fn aggregates_mut(&mut self) -> &mut Aggregates {
        &mut self.aggregates
    }

    /// Construct an attribute from its definition value.
    pub fn create(&mut self, key: &str, value: &Value) -> AttributeResult<Box<dyn Attribute>> {
        self.registry.create(key, value, &mut self.aggregates)
    }

    /// Call a type-level function `fn() -> R`.
    pub fn call<R: Any>(&self, name: &str) -> AttributeResult<R> {
        self.call_with(name, ())
    }

    /// Call a type-level function `fn(A) -> R`.
    pub fn call_with<A: Any, R: Any>(&self, name: &str, arg: A) -> AttributeResult<R> {
        self.registry.call_static(&self.aggregates, name, arg)
    }

    /// Call an instance-bound function `fn() -> R` on `attribute`.
    pub fn call_on<R: Any>(&self, attribute: &dyn Attribute, name: &str) -> AttributeResult<R> {
        self.call_on_with(attribute, name, ())
    }

    /// Call an instance-bound function `fn(A) -> R` on `attribute`.
    pub fn call_on_with<A: Any, R: Any>(
        &self,
        attribute: &dyn Attribute,
        name: &str,
        arg: A,
    ) -> AttributeResult<R> {
        self.registry.call_instance(attribute, name, arg)
    }
}
