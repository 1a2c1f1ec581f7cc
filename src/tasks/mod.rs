//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod redraw;

// Re-export main items
pub use redraw::{redraw_task, ElapsedTracer, REDRAW_CADENCE};
