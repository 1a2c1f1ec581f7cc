//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;
use tracing::warn;

use crate::{
    error::ProgressError,
    progress::{parse_hex_color, Color, ProgressController},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "segmented-progress")]
#[command(about = "A pausable auto-advancing progress bar with divider marks, driven over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Auto progress duration in milliseconds
    #[arg(short, long, default_value = "10000", allow_negative_numbers = true)]
    pub duration: i64,

    /// Milliseconds between progress updates
    #[arg(long, default_value = "16")]
    pub tick_interval: u64,

    /// Start advancing right away instead of waiting for /resume
    #[arg(long)]
    pub autostart: bool,

    /// Draw divider marks
    #[arg(long)]
    pub dividers: bool,

    /// Width of a divider mark
    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    pub divider_width: f32,

    /// Corner radius of the filled part of the bar
    #[arg(long, default_value = "0.0")]
    pub corner_radius: f32,

    /// Progress color as #RRGGBB or #AARRGGBB
    #[arg(long, value_parser = parse_hex_color)]
    pub progress_color: Option<Color>,

    /// Divider color as #RRGGBB or #AARRGGBB
    #[arg(long, value_parser = parse_hex_color)]
    pub divider_color: Option<Color>,

    /// Comma separated gradient stops, replaces the progress color
    #[arg(long, value_parser = parse_hex_color, value_delimiter = ',')]
    pub gradient: Vec<Color>,

    /// Width of the bar drawn in the log, in characters
    #[arg(long, default_value = "40")]
    pub render_columns: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval)
    }

    /// Push the configured appearance into a controller.
    ///
    /// Invalid values are skipped; the first one is returned after everything
    /// else has been applied.
    pub fn apply_appearance(&self, controller: &ProgressController) -> Result<(), ProgressError> {
        controller.set_dividers_enabled(self.dividers);
        controller.set_corner_radius(self.corner_radius);
        if let Some(color) = self.progress_color {
            controller.set_progress_color(color);
        }
        if let Some(color) = self.divider_color {
            controller.set_divider_color(color);
        }
        if !self.gradient.is_empty() {
            controller.set_gradient_colors(self.gradient.clone());
        }
        controller.set_divider_width(self.divider_width).map_err(|e| {
            warn!("Keeping default divider width");
            e
        })
    }
}
