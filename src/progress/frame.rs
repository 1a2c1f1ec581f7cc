//! Immutable snapshot of what the bar should currently show

use serde::{Deserialize, Serialize};

use super::appearance::Appearance;

/// Everything a renderer needs to draw one frame of the bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressFrame {
    /// Completed fraction in `0.0..=1.0`
    pub percent_complete: f32,
    /// Divider positions as fractions, in the order they were added
    pub dividers: Vec<f32>,
    /// Elapsed time reported by the last tick
    pub elapsed_millis: u64,
    pub appearance: Appearance,
}

impl ProgressFrame {
    pub fn new() -> Self {
        Self {
            percent_complete: 0.0,
            dividers: Vec::new(),
            elapsed_millis: 0,
            appearance: Appearance::new(),
        }
    }

    pub fn divider_count(&self) -> usize {
        self.dividers.len()
    }

    /// Dividers that should actually be drawn
    pub fn visible_dividers(&self) -> &[f32] {
        if self.appearance.dividers_enabled {
            &self.dividers
        } else {
            &[]
        }
    }

    /// Check if the bar is full
    pub fn is_complete(&self) -> bool {
        self.percent_complete >= 1.0
    }
}

impl Default for ProgressFrame {
    fn default() -> Self {
        Self::new()
    }
}
