//! Segmented Progress - a pausable, auto-advancing progress bar
//! 
//! This library provides a countdown that can be paused and resumed without
//! losing time, a controller that turns its ticks into a progress fraction
//! with divider marks, and a small HTTP surface to drive it.

pub mod api;
pub mod config;
pub mod countdown;
pub mod error;
pub mod progress;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use countdown::{CountdownHandler, PausableCountdown};
pub use error::ProgressError;
pub use progress::{ProgressController, ProgressFrame, ProgressListener};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
