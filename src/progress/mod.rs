//! Progress bar module
//!
//! The controller composes a pausable countdown with the progress fraction and
//! divider bookkeeping; frames and appearance are what a renderer consumes.

pub mod appearance;
pub mod controller;
pub mod frame;
pub mod text_bar;

// Re-export main types
pub use appearance::{parse_hex_color, Appearance, Color};
pub use controller::{ProgressController, ProgressListener, FRAME_INTERVAL};
pub use frame::ProgressFrame;
pub use text_bar::render_text_bar;
