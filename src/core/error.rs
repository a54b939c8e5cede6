//! Error types for attribute construction and dispatch.
//!
//! Construction errors (`UnknownAttributeKey`, `MalformedDefinition`,
//! `DuplicateDefinitionKey`) are recoverable: the setup caller decides whether
//! to skip the offending module or abort. Registration and dispatch errors
//! indicate programming defects and should be surfaced immediately.

use thiserror::Error;

use crate::attributes::AttributeKey;

/// Errors produced by the attribute subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// A definition referenced a key with no registered factory.
    #[error("unknown attribute key '{0}'")]
    UnknownAttributeKey(AttributeKey),

    /// A definition value did not have the shape its factory expects.
    #[error("malformed definition for '{key}': {reason}")]
    MalformedDefinition {
        /// Key of the attribute being constructed.
        key: AttributeKey,
        /// What was wrong with the value.
        reason: String,
    },

    /// The same attribute key was registered twice.
    #[error("attribute '{0}' is already registered")]
    DuplicateRegistration(AttributeKey),

    /// A single module definition listed the same key twice.
    #[error("attribute '{0}' appears more than once in one definition")]
    DuplicateDefinitionKey(AttributeKey),

    /// A dispatch name was registered twice in the same table.
    #[error("dispatch function '{0}' is already registered")]
    DuplicateFunction(String),

    /// No dispatch function with this name exists.
    #[error("no dispatch function named '{0}'")]
    DispatchNameNotFound(String),

    /// The caller's expected signature does not match the registered one.
    #[error("dispatch function '{name}' has signature {registered}, called as {requested}")]
    DispatchTypeMismatch {
        /// Dispatch name.
        name: String,
        /// Signature the function was registered with.
        registered: String,
        /// Signature the caller asked for.
        requested: String,
    },
}

impl AttributeError {
    /// Build a `MalformedDefinition` error.
    pub fn malformed(key: impl Into<AttributeKey>, reason: impl Into<String>) -> Self {
        Self::MalformedDefinition {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// True for errors a setup caller may recover from by skipping a module.
    #[must_use]
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAttributeKey(_)
                | Self::MalformedDefinition { .. }
                | Self::DuplicateDefinitionKey(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type AttributeResult<T> = Result<T, AttributeError>;
