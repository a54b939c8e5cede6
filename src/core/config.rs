//! Attribute tracking configuration.
//!
//! Whether modules carry attributes at all is the caller's decision. This
//! module turns the user's configuration and what the registry and palette
//! report into a [`TrackingPlan`] the lattice setup can follow:
//!
//! 1. Before modules are built: skip attributes if the user disabled them or
//!    no attribute type is linked.
//! 2. After modules are built: skip them if no color was ever constructed
//!    and nothing motion-reactive is linked; warn when a single color is in
//!    use, since attribute-aware search then only costs time.
//!
//! A palette query that fails for any reason other than color not being
//! linked is a programming error and is returned, never downgraded.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::builtin::color::PALETTE_SIZE_FN;
use crate::registry::{AttributeContext, AttributeRegistry};

use super::error::{AttributeError, AttributeResult};

/// User-facing switches for attribute tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Track attributes at all (false = ignore every `"properties"` entry).
    pub enabled: bool,

    /// Log a warning when only one color is used.
    pub warn_single_color: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warn_single_color: true,
        }
    }
}

impl TrackingConfig {
    /// Enable or disable attribute tracking.
    #[must_use]
    pub fn with_tracking(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enable or disable the single-color warning.
    #[must_use]
    pub fn with_single_color_warning(mut self, warn: bool) -> Self {
        self.warn_single_color = warn;
        self
    }
}

/// Why attribute tracking was turned off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The user disabled tracking.
    Disabled,
    /// No attribute type is linked.
    NoLinkedTypes,
    /// Setup built no colors and nothing motion-reactive is linked.
    EmptyPalette,
}

/// What the setup caller should do with attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingPlan {
    /// Build and compare attribute sets.
    pub track_attributes: bool,
    /// Call `AttributeSet::propagate` after moves.
    pub propagate_moves: bool,
    /// Set when `track_attributes` is false.
    pub skipped: Option<SkipReason>,
    /// Set when the single-color warning was logged.
    pub single_color_warned: bool,
}

impl TrackingPlan {
    fn skip(reason: SkipReason) -> Self {
        info!("attribute tracking skipped: {reason:?}");
        Self {
            track_attributes: false,
            propagate_moves: false,
            skipped: Some(reason),
            single_color_warned: false,
        }
    }

    /// Plan before any module is constructed.
    #[must_use]
    pub fn before_setup(config: &TrackingConfig, registry: &AttributeRegistry) -> Self {
        if !config.enabled {
            return Self::skip(SkipReason::Disabled);
        }
        if registry.linked_type_count() == 0 {
            return Self::skip(SkipReason::NoLinkedTypes);
        }
        Self {
            track_attributes: true,
            propagate_moves: registry.any_motion_reactive_linked(),
            skipped: None,
            single_color_warned: false,
        }
    }

    /// Refine the plan once every module's attributes have been built.
    ///
    /// Fails with `DispatchTypeMismatch` if `color.palette_size` is
    /// registered with a signature other than `fn(()) -> usize`.
    pub fn after_setup(
        mut self,
        config: &TrackingConfig,
        ctx: &AttributeContext,
    ) -> AttributeResult<Self> {
        if !self.track_attributes {
            return Ok(self);
        }
        let palette_size = match ctx.call::<usize>(PALETTE_SIZE_FN) {
            Ok(size) => size,
            // Color not linked: no palette heuristic applies.
            Err(AttributeError::DispatchNameNotFound(_)) => return Ok(self),
            Err(err) => return Err(err),
        };
        if palette_size == 0 && !ctx.registry().any_motion_reactive_linked() {
            return Ok(Self::skip(SkipReason::EmptyPalette));
        }
        if palette_size == 1 && config.warn_single_color {
            warn!("only one color used; consider disabling attribute tracking to improve performance");
            self.single_color_warned = true;
        }
        Ok(self)
    }

    /// Plan in one step, for callers that build modules in between.
    pub fn assess(config: &TrackingConfig, ctx: &AttributeContext) -> AttributeResult<Self> {
        Self::before_setup(config, ctx.registry()).after_setup(config, ctx)
    }
}
