//! Color attribute and the run-wide palette.
//!
//! A color definition value may be:
//!
//! - an array of 1 to 4 integer channels in `0..=255`, packed most
//!   significant channel first (`[255, 0, 0]` → `0xFF0000`)
//! - a hex string, `"#RRGGBB"` or `"#RGB"`
//! - a color name from a fixed table (`"red"`, `"navy"`, ...), case-insensitive
//!
//! Every successfully constructed color is added to the [`Palette`] held in
//! the run's aggregates. The palette is append-only: dropping attributes
//! never removes colors from it. Setup code reads it to decide whether
//! attribute-aware search is worthwhile.
//!
//! ## Dispatch functions
//!
//! | Name | Kind | Signature |
//! |---|---|---|
//! | `color.palette` | static | `fn(()) -> im::HashSet<u32>` |
//! | `color.palette_size` | static | `fn(()) -> usize` |
//! | `color.from_name` | static | `fn(String) -> Option<u32>` |
//! | `color.value` | instance | `fn(()) -> u32` |

use std::any::Any;

use log::trace;
use serde_json::Value;

use crate::attributes::{same_type, stable_hash, Attribute, AttributeType};
use crate::core::{AttributeError, AttributeResult};
use crate::registry::{Aggregates, AttributeRegistry};

/// Registry key of the color attribute.
pub const COLOR_KEY: &str = "color";

/// Static function returning a snapshot of the palette.
pub const PALETTE_FN: &str = "color.palette";

/// Static function returning the number of distinct colors seen.
pub const PALETTE_SIZE_FN: &str = "color.palette_size";

/// Static function resolving a color name.
pub const FROM_NAME_FN: &str = "color.from_name";

/// Instance function returning the packed color.
pub const VALUE_FN: &str = "color.value";

const MAX_CHANNELS: usize = 4;

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("lime", 0x00FF00),
    ("green", 0x008000),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("cyan", 0x00FFFF),
    ("aqua", 0x00FFFF),
    ("magenta", 0xFF00FF),
    ("fuchsia", 0xFF00FF),
    ("silver", 0xC0C0C0),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("maroon", 0x800000),
    ("olive", 0x808000),
    ("purple", 0x800080),
    ("teal", 0x008080),
    ("navy", 0x000080),
    ("orange", 0xFFA500),
    ("pink", 0xFFC0CB),
    ("brown", 0xA52A2A),
];

/// Resolve a color name.
#[must_use]
pub fn color_from_name(name: &str) -> Option<u32> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, value)| value)
}

/// Parse `#RRGGBB` or `#RGB`.
#[must_use]
pub fn color_from_hex(hex: &str) -> Option<u32> {
    let digits = hex.strip_prefix('#')?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        6 => u32::from_str_radix(digits, 16).ok(),
        3 => {
            let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
            u32::from_str_radix(&expanded, 16).ok()
        }
        _ => None,
    }
}

fn pack_channels(channels: &[Value]) -> AttributeResult<u32> {
    if channels.is_empty() || channels.len() > MAX_CHANNELS {
        return Err(AttributeError::malformed(
            COLOR_KEY,
            format!("expected 1 to {MAX_CHANNELS} channels, got {}", channels.len()),
        ));
    }
    channels.iter().try_fold(0u32, |packed, channel| {
        let channel = channel
            .as_u64()
            .filter(|&c| c <= 0xFF)
            .ok_or_else(|| {
                AttributeError::malformed(COLOR_KEY, format!("invalid channel {channel}"))
            })?;
        // Checked above: at most four 8-bit channels fit in 32 bits.
        Ok((packed << 8) | channel as u32)
    })
}

/// Distinct colors constructed during a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: im::HashSet<u32>,
}

impl Palette {
    /// Record a color. Returns true if it was new.
    pub fn insert(&mut self, color: u32) -> bool {
        self.colors.insert(color).is_none()
    }

    /// Check if a color has been seen.
    #[must_use]
    pub fn contains(&self, color: u32) -> bool {
        self.colors.contains(&color)
    }

    /// Number of distinct colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if no color has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The recorded colors.
    #[must_use]
    pub fn colors(&self) -> &im::HashSet<u32> {
        &self.colors
    }
}

/// A module's color, stored as one packed integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorAttribute {
    color: u32,
}

impl ColorAttribute {
    /// Create a color from an already packed value.
    ///
    /// Does not touch any palette; use the registry for tracked construction.
    #[must_use]
    pub const fn from_packed(color: u32) -> Self {
        Self { color }
    }

    /// Parse a definition value without recording it anywhere.
    pub fn parse(value: &Value) -> AttributeResult<Self> {
        let color = match value {
            Value::Array(channels) => pack_channels(channels)?,
            Value::String(s) if s.starts_with('#') => color_from_hex(s).ok_or_else(|| {
                AttributeError::malformed(COLOR_KEY, format!("invalid hex color '{s}'"))
            })?,
            Value::String(s) => color_from_name(s).ok_or_else(|| {
                AttributeError::malformed(COLOR_KEY, format!("unknown color name '{s}'"))
            })?,
            other => {
                return Err(AttributeError::malformed(
                    COLOR_KEY,
                    format!("expected channel array, hex string or name, got {other}"),
                ))
            }
        };
        Ok(Self { color })
    }

    /// The packed color value.
    #[must_use]
    pub const fn packed(&self) -> u32 {
        self.color
    }
}

impl Attribute for ColorAttribute {
    fn key(&self) -> &str {
        COLOR_KEY
    }

    fn eq_same_type(&self, other: &dyn Attribute) -> bool {
        self.color == same_type(self, other).color
    }

    fn clone_box(&self) -> Box<dyn Attribute> {
        Box::new(*self)
    }

    fn attribute_hash(&self) -> u64 {
        stable_hash(&self.color)
    }

    fn as_int(&self) -> u64 {
        u64::from(self.color)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl AttributeType for ColorAttribute {
    const KEY: &'static str = COLOR_KEY;

    fn from_definition(value: &Value, aggregates: &mut Aggregates) -> AttributeResult<Self> {
        let color = Self::parse(value)?;
        if aggregates.get_or_default::<Palette>().insert(color.color) {
            trace!("palette gained color {:#08X}", color.color);
        }
        Ok(color)
    }

    fn link(registry: &mut AttributeRegistry) -> AttributeResult<()> {
        registry.register_type::<Self>()?;
        registry.register_static_fn(PALETTE_FN, |aggregates: &Aggregates, (): ()| {
            aggregates
                .get::<Palette>()
                .map(|p| p.colors().clone())
                .unwrap_or_default()
        })?;
        registry.register_static_fn(PALETTE_SIZE_FN, |aggregates: &Aggregates, (): ()| {
            aggregates.get::<Palette>().map_or(0, Palette::len)
        })?;
        registry.register_static_fn(FROM_NAME_FN, |_: &Aggregates, name: String| {
            color_from_name(&name)
        })?;
        registry.register_instance_fn(VALUE_FN, |color: &Self, (): ()| color.color)
    }
}
