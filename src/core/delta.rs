//! Coordinate displacement of a single module move.
//!
//! The lattice layer owns coordinates; attributes only ever see the
//! difference between a module's position before and after a move.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Per-axis displacement of one move.
///
/// Inline storage covers 2D and 3D lattices without allocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveDelta(SmallVec<[i32; 3]>);

impl MoveDelta {
    /// Create a delta from per-axis components.
    pub fn new(components: impl IntoIterator<Item = i32>) -> Self {
        Self(components.into_iter().collect())
    }

    /// Delta between two coordinates (`to - from`).
    ///
    /// Returns `None` if the coordinates have different orders or a
    /// component overflows `i32`.
    #[must_use]
    pub fn between(from: &[i32], to: &[i32]) -> Option<Self> {
        if from.len() != to.len() {
            return None;
        }
        from.iter()
            .zip(to)
            .map(|(a, b)| b.checked_sub(*a))
            .collect::<Option<_>>()
            .map(Self)
    }

    /// Number of axes.
    #[must_use]
    pub fn order(&self) -> usize {
        self.0.len()
    }

    /// Per-axis components.
    #[must_use]
    pub fn components(&self) -> &[i32] {
        &self.0
    }

    /// True if the module did not actually move.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// Component-wise sign (-1, 0, 1).
    #[must_use]
    pub fn signum(&self) -> Self {
        Self(self.0.iter().map(|c| c.signum()).collect())
    }
}

impl From<&[i32]> for MoveDelta {
    fn from(components: &[i32]) -> Self {
        Self(components.iter().copied().collect())
    }
}

impl<const N: usize> From<[i32; N]> for MoveDelta {
    fn from(components: [i32; N]) -> Self {
        Self::new(components)
    }
}
