//! Attribute keys.
//!
//! A key names one concrete attribute type ("color", "heading"). Dispatch
//! functions are named `"<key>.<name>"` by convention.

use serde::{Deserialize, Serialize};

/// Key identifying an attribute type.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeKey(pub String);

impl AttributeKey {
    /// Create a new attribute key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for AttributeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AttributeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AttributeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_key() {
        let key1 = AttributeKey::new("color");
        let key2: AttributeKey = "color".into();
        assert_eq!(key1, key2);
        assert_eq!(key1.as_str(), "color");
        assert_eq!(format!("{}", key1), "color");
    }

    #[test]
    fn test_serde_transparent() {
        let key = AttributeKey::new("heading");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"heading\"");
        let back: AttributeKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
