//! Visual configuration handed through to the renderer

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

/// An ARGB color packed into a `u32`.
pub type Color = u32;

pub const DEFAULT_PROGRESS_COLOR: Color = 0xFF21_96F3;
pub const DEFAULT_DIVIDER_COLOR: Color = 0xFFFF_FFFF;

/// How the bar should look. None of this affects timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub progress_color: Color,
    pub divider_color: Color,
    pub divider_width: f32,
    pub dividers_enabled: bool,
    pub corner_radius: f32,
    /// Gradient stops; when non-empty they replace the flat progress color.
    pub gradient_colors: Vec<Color>,
}

impl Appearance {
    pub fn new() -> Self {
        Self {
            progress_color: DEFAULT_PROGRESS_COLOR,
            divider_color: DEFAULT_DIVIDER_COLOR,
            divider_width: 1.0,
            dividers_enabled: false,
            corner_radius: 0.0,
            gradient_colors: Vec::new(),
        }
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `#RRGGBB` (opaque) or `#AARRGGBB` into a packed ARGB color
pub fn parse_hex_color(value: &str) -> Result<Color, ProgressError> {
    let invalid = || ProgressError::InvalidColor(value.to_string());
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let parsed = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
    match hex.len() {
        6 => Ok(0xFF00_0000 | parsed),
        8 => Ok(parsed),
        _ => Err(invalid()),
    }
}
