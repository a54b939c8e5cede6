//! Named dispatch tables.
//!
//! Dispatch lets the lattice and search layers invoke attribute-specific
//! behaviour by name ("give me the palette") without depending on the
//! concrete attribute type. Every entry records its full signature:
//! receiver type (instance functions only), argument type, and return type.
//! A call states the signature it expects and is refused with
//! `DispatchTypeMismatch` unless both sides agree, so a wrong assumption
//! fails loudly instead of producing garbage.
//!
//! Functions without arguments use `()` as their argument type.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;

use crate::attributes::Attribute;
use crate::core::{AttributeError, AttributeResult};

use super::aggregates::Aggregates;

/// Type-erased static (type-level) function.
pub type StaticFn = dyn Fn(&Aggregates, Box<dyn Any>) -> Option<Box<dyn Any>>;

/// Type-erased instance-bound function.
pub type InstanceFn = dyn Fn(&dyn Attribute, Box<dyn Any>) -> Option<Box<dyn Any>>;

/// One side of a signature: a Rust type and its printable name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for type `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Underlying type id.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Printable type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Argument/return contract of a dispatch function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    /// Argument type (`()` for none).
    pub arg: TypeTag,
    /// Return type.
    pub ret: TypeTag,
}

impl Signature {
    /// Signature `fn(A) -> R`.
    #[must_use]
    pub fn of<A: Any, R: Any>() -> Self {
        Self {
            arg: TypeTag::of::<A>(),
            ret: TypeTag::of::<R>(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) -> {}", self.arg.name, self.ret.name)
    }
}

struct DispatchEntry<F: ?Sized> {
    signature: Signature,
    receiver: Option<&'static str>,
    func: Box<F>,
}

/// Name-keyed table of functions sharing one calling convention.
pub struct DispatchTable<F: ?Sized> {
    entries: FxHashMap<String, DispatchEntry<F>>,
}

impl<F: ?Sized> Default for DispatchTable<F> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<F: ?Sized> DispatchTable<F> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function. Names are unique within a table.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        signature: Signature,
        receiver: Option<&'static str>,
        func: Box<F>,
    ) -> AttributeResult<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(AttributeError::DuplicateFunction(name));
        }
        debug!("registered dispatch function '{name}' {signature}");
        self.entries.insert(
            name,
            DispatchEntry {
                signature,
                receiver,
                func,
            },
        );
        Ok(())
    }

    /// Find a function and check it against the caller's expected signature.
    pub fn lookup(&self, name: &str, expected: Signature) -> AttributeResult<&F> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| AttributeError::DispatchNameNotFound(name.to_string()))?;
        if entry.signature != expected {
            return Err(mismatch(name, entry.signature.to_string(), expected.to_string()));
        }
        Ok(entry.func.as_ref())
    }

    /// Registered signature for a name.
    #[must_use]
    pub fn signature(&self, name: &str) -> Option<Signature> {
        self.entries.get(name).map(|e| e.signature)
    }

    /// Receiver key an instance function is bound to.
    #[must_use]
    pub fn receiver(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).and_then(|e| e.receiver)
    }

    /// Check if a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> fmt::Debug for DispatchTable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, e)| (name, e.signature.to_string())))
            .finish()
    }
}

/// Build a `DispatchTypeMismatch` error.
pub(crate) fn mismatch(name: &str, registered: String, requested: String) -> AttributeError {
    AttributeError::DispatchTypeMismatch {
        name: name.to_string(),
        registered,
        requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> Box<StaticFn> {
        Box::new(|_: &Aggregates, _: Box<dyn Any>| {
            Some(Box::new(42u32) as Box<dyn Any>)
        })
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table: DispatchTable<StaticFn> = DispatchTable::new();
        table
            .insert("answer", Signature::of::<(), u32>(), None, answer())
            .unwrap();

        let func = table.lookup("answer", Signature::of::<(), u32>()).unwrap();
        let result = func(&Aggregates::new(), Box::new(())).unwrap();
        assert_eq!(*result.downcast::<u32>().unwrap(), 42);
        assert_eq!(table.len(), 1);
        assert!(table.contains("answer"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut table: DispatchTable<StaticFn> = DispatchTable::new();
        table
            .insert("answer", Signature::of::<(), u32>(), None, answer())
            .unwrap();
        let err = table
            .insert("answer", Signature::of::<(), u32>(), None, answer())
            .unwrap_err();
        assert_eq!(err, AttributeError::DuplicateFunction("answer".into()));
    }

    #[test]
    fn test_lookup_errors() {
        let mut table: DispatchTable<StaticFn> = DispatchTable::new();
        table
            .insert("answer", Signature::of::<(), u32>(), None, answer())
            .unwrap();

        assert!(matches!(
            table.lookup("question", Signature::of::<(), u32>()),
            Err(AttributeError::DispatchNameNotFound(name)) if name == "question"
        ));

        match table.lookup("answer", Signature::of::<(), i64>()) {
            Err(AttributeError::DispatchTypeMismatch { name, registered, requested }) => {
                assert_eq!(name, "answer");
                assert_eq!(registered, "fn(()) -> u32");
                assert_eq!(requested, "fn(()) -> i64");
            }
            _ => panic!("expected a type mismatch"),
        }
    }

    #[test]
    fn test_signature_display() {
        assert_eq!(Signature::of::<u8, bool>().to_string(), "fn(u8) -> bool");
    }
}
