//! Pausable countdown module
//!
//! A countdown that reports remaining time on a fixed cadence, survives any
//! number of pause/resume cycles and fires its finish callback exactly once.

pub mod state;
pub mod timer;

pub use state::{next_tick_delay, CountdownState, Phase, Step};
pub use timer::{CountdownHandler, PausableCountdown};
