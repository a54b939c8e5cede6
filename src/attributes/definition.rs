//! Declarative attribute definitions.
//!
//! A definition is the `"properties"` object of one module in a scenario
//! file: each entry maps an attribute key to an attribute-specific value.
//!
//! ```json
//! { "color": [255, 0, 0], "heading": [1, 0] }
//! ```
//!
//! Entries are kept in source order and duplicates are preserved, so that
//! [`AttributeSet::from_definition`](super::AttributeSet::from_definition)
//! can reject a key listed twice instead of silently keeping one of them.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::key::AttributeKey;

/// Ordered `(key, value)` entries describing one module's attributes.
///
/// ## Example
///
/// ```
/// use lattice_props::attributes::AttributeDefinition;
///
/// let def = AttributeDefinition::new()
///     .with_attr("color", "#00ff00");
///
/// assert_eq!(def.len(), 1);
/// assert_eq!(def.get("color").and_then(|v| v.as_str()), Some("#00ff00"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeDefinition {
    entries: Vec<(AttributeKey, Value)>,
}

impl AttributeDefinition {
    /// Create an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder pattern).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<AttributeKey>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    /// Append an entry.
    pub fn push(&mut self, key: impl Into<AttributeKey>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Parse a definition from JSON text, keeping duplicate keys.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Get the first value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    /// Iterate over entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the definition has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AttributeDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = AttributeDefinition;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute keys to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<AttributeKey, Value>()? {
                    entries.push((key, value));
                }
                Ok(AttributeDefinition { entries })
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
