//! Run-wide side tables owned by attribute types.
//!
//! Some attribute types keep an aggregate across every instance built during
//! a run (the color palette is the canonical example). Instead of process
//! globals, those aggregates live in an `Aggregates` map keyed by their Rust
//! type and owned by the [`AttributeContext`](super::AttributeContext), so
//! each run or test starts from a clean slate.
//!
//! Aggregates are `Clone`, so a caller can checkpoint them before building a
//! module and restore the checkpoint if the build fails.

use std::any::{Any, TypeId};
use std::fmt;

use rustc_hash::FxHashMap;

trait Table: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_table(&self) -> Box<dyn Table>;
}

impl<T: Any + Clone> Table for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_table(&self) -> Box<dyn Table> {
        Box::new(self.clone())
    }
}

/// Type-keyed map of side aggregates, at most one value per type.
///
/// Cloning clones every table; keep tables cheap to clone (persistent
/// collections such as `im::HashSet`).
#[derive(Default)]
pub struct Aggregates {
    tables: FxHashMap<TypeId, Box<dyn Table>>,
}

impl Aggregates {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the aggregate of type `T`, if one was created.
    #[must_use]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.tables
            .get(&TypeId::of::<T>())
            .and_then(|table| table.as_ref().as_any().downcast_ref::<T>())
    }

    /// Get the aggregate of type `T`, creating it from `Default` if absent.
    pub fn get_or_default<T: Any + Clone + Default>(&mut self) -> &mut T {
        self.tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()))
            .as_mut()
            .as_any_mut()
            .downcast_mut::<T>()
            .expect("Aggregate stored under a foreign TypeId")
    }

    /// Insert or replace the aggregate of type `T`.
    pub fn insert<T: Any + Clone>(&mut self, value: T) -> Option<T> {
        self.tables
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.into_any().downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Check if an aggregate of type `T` exists.
    #[must_use]
    pub fn contains<T: Any>(&self) -> bool {
        self.tables.contains_key(&TypeId::of::<T>())
    }

    /// Number of aggregates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no aggregates exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Clone for Aggregates {
    fn clone(&self) -> Self {
        Self {
            tables: self
                .tables
                .iter()
                .map(|(id, table)| (*id, table.as_ref().clone_table()))
                .collect(),
        }
    }
}

impl fmt::Debug for Aggregates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregates")
            .field("len", &self.tables.len())
            .finish()
    }
}
