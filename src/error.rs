//! Error type shared by the countdown and the progress controller

use thiserror::Error;

/// Errors reported by countdown and progress operations.
///
/// None of these are fatal: every operation that returns one has already
/// logged it and left the existing state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgressError {
    #[error("duration can not be negative (got {0}ms)")]
    NegativeDuration(i64),

    #[error("auto progress is not initialized, call enable_auto_progress first")]
    NotConfigured,

    #[error("progress value can only be between 0 and 1 (got {0})")]
    ProgressOutOfRange(f32),

    #[error("divider width can not be negative (got {0})")]
    NegativeDividerWidth(f32),

    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,

    #[error("countdown must be created inside a tokio runtime")]
    NoRuntime,

    #[error("invalid color '{0}', expected #RRGGBB or #AARRGGBB")]
    InvalidColor(String),
}
