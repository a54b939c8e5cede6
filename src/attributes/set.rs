//! Per-module attribute sets.
//!
//! Every module record owns exactly one `AttributeSet`. The search layer
//! combines its equality and hash with the module's coordinates to build
//! the keys used for visited-state and goal-state comparison, so both must
//! be independent of insertion order.

use std::hash::{Hash, Hasher};

use log::trace;
use rustc_hash::FxHashMap;

use super::definition::AttributeDefinition;
use super::key::AttributeKey;
use super::traits::{stable_hash, Attribute};
use crate::core::{AttributeError, AttributeResult, MoveDelta};
use crate::registry::AttributeContext;

/// The attributes owned by one module, at most one per key.
///
/// Cloning deep-copies every attribute; two sets never share state.
///
/// ## Example
///
/// ```
/// use lattice_props::attributes::{AttributeDefinition, AttributeSet};
/// use lattice_props::registry::AttributeContext;
///
/// let mut ctx = AttributeContext::with_builtins();
/// let def = AttributeDefinition::new().with_attr("color", "red");
///
/// let a = AttributeSet::from_definition(&mut ctx, &def).unwrap();
/// let b = a.clone();
/// assert_eq!(a, b);
/// assert_eq!(a.as_int(), 0xFF0000);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AttributeSet {
    attributes: FxHashMap<AttributeKey, Box<dyn Attribute>>,
}

impl AttributeSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a declarative definition.
    ///
    /// Keys are checked before anything is constructed: an unregistered key
    /// yields `UnknownAttributeKey` and a key listed twice yields
    /// `DuplicateDefinitionKey`. A value the factory rejects yields
    /// `MalformedDefinition`. On error no set is returned and the context's
    /// aggregates are restored to their state before the call, so a module
    /// that fails to build leaves no trace (no palette entry, for example).
    pub fn from_definition(
        ctx: &mut AttributeContext,
        definition: &AttributeDefinition,
    ) -> AttributeResult<Self> {
        let mut seen = Vec::with_capacity(definition.len());
        for (key, _) in definition.iter() {
            if !ctx.registry().is_registered(key.as_str()) {
                return Err(AttributeError::UnknownAttributeKey(key.clone()));
            }
            if seen.contains(&key) {
                return Err(AttributeError::DuplicateDefinitionKey(key.clone()));
            }
            seen.push(key);
        }

        let checkpoint = ctx.aggregates().clone();
        let mut set = Self::new();
        for (key, value) in definition.iter() {
            match ctx.create(key.as_str(), value) {
                Ok(attribute) => {
                    set.attributes.insert(key.clone(), attribute);
                }
                Err(err) => {
                    *ctx.aggregates_mut() = checkpoint;
                    return Err(err);
                }
            }
        }
        trace!("built attribute set with {} attributes", set.len());
        Ok(set)
    }

    /// Insert an attribute under its own key, returning any replaced one.
    pub fn insert(&mut self, attribute: Box<dyn Attribute>) -> Option<Box<dyn Attribute>> {
        let key = AttributeKey::new(attribute.key());
        self.attributes.insert(key, attribute)
    }

    /// Remove the attribute for a key.
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Attribute>> {
        self.attributes.remove(key)
    }

    /// Look up the attribute for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn Attribute> {
        self.attributes.get(key).map(|a| a.as_ref())
    }

    /// Look up an attribute and downcast it to its concrete type.
    ///
    /// Returns `None` if the key is absent or holds a different type.
    #[must_use]
    pub fn get_as<T: Attribute>(&self, key: &str) -> Option<&T> {
        self.get(key).and_then(|a| a.as_any().downcast_ref::<T>())
    }

    /// Check if an attribute is present for a key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over keys (arbitrary order).
    pub fn keys(&self) -> impl Iterator<Item = &AttributeKey> {
        self.attributes.keys()
    }

    /// Iterate over attributes (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &dyn Attribute)> {
        self.attributes.iter().map(|(k, a)| (k, a.as_ref()))
    }

    /// Number of motion-reactive attributes in this set.
    #[must_use]
    pub fn motion_count(&self) -> usize {
        self.attributes
            .values()
            .filter(|a| a.as_motion().is_some())
            .count()
    }

    /// Forward a move of the owning module to every motion-reactive attribute.
    ///
    /// A no-op for sets without motion-reactive attributes. Callers may skip
    /// it when the registry reports none are linked.
    pub fn propagate(&mut self, delta: &MoveDelta) {
        for attribute in self.attributes.values_mut() {
            if let Some(motion) = attribute.as_motion_mut() {
                trace!("propagating move {:?} to '{}'", delta.components(), motion.key());
                motion.on_move(delta);
            }
        }
    }

    /// Lossy integer encoding of the whole set.
    ///
    /// Folds per-attribute encodings in key order, so a set holding a single
    /// attribute encodes to that attribute's own value.
    #[must_use]
    pub fn as_int(&self) -> u64 {
        let mut keys: Vec<_> = self.attributes.keys().collect();
        keys.sort();
        keys.into_iter()
            .fold(0u64, |acc, key| acc.rotate_left(21) ^ self.attributes[key].as_int())
    }

    /// Order-independent hash of the set.
    ///
    /// Each attribute's hash is salted with its key and the results are
    /// summed, so iteration order never matters. The empty set always
    /// hashes to the same value.
    #[must_use]
    pub fn set_hash(&self) -> u64 {
        let combined = self
            .attributes
            .iter()
            .map(|(key, attribute)| stable_hash(&(key.as_str(), attribute.attribute_hash())))
            .fold(0u64, u64::wrapping_add);
        stable_hash(&(self.attributes.len(), combined))
    }
}

impl PartialEq for AttributeSet {
    fn eq(&self, other: &Self) -> bool {
        self.attributes.len() == other.attributes.len()
            && self.attributes.iter().all(|(key, attribute)| {
                other
                    .attributes
                    .get(key)
                    .is_some_and(|theirs| attribute.eq_same_type(theirs.as_ref()))
            })
    }
}

impl Eq for AttributeSet {}

impl Hash for AttributeSet {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.set_hash().hash(hasher);
    }
}

impl FromIterator<Box<dyn Attribute>> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Box<dyn Attribute>>>(iter: I) -> Self {
        let mut set = Self::new();
        for attribute in iter {
            set.insert(attribute);
        }
        set
    }
}
