//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::ProgressStatus;

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub progress: ProgressStatus,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, progress: ProgressStatus) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            progress,
        }
    }

    /// The action was applied
    pub fn ok(message: String, progress: ProgressStatus) -> Self {
        Self::new("ok".to_string(), message, progress)
    }

    /// The action was valid but had nothing to do
    pub fn ignored(message: String, progress: ProgressStatus) -> Self {
        Self::new("ignored".to_string(), message, progress)
    }

    /// The action was rejected
    pub fn error(message: String, progress: ProgressStatus) -> Self {
        Self::new("error".to_string(), message, progress)
    }
}

/// Body of POST /progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishProgressRequest {
    pub value: f32,
}

/// Body of POST /auto-progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoProgressRequest {
    pub duration_millis: i64,
}

/// Status response with server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub progress: ProgressStatus,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
