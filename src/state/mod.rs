//! State management module
//! 
//! This module contains the shared application state handed to every endpoint.

pub mod app_state;
pub mod progress_status;

// Re-export main types
pub use app_state::AppState;
pub use progress_status::ProgressStatus;
