//! Main application state management

use std::{
    sync::Mutex,
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::ProgressStatus;
use crate::progress::ProgressController;

/// Application state shared by all endpoints
pub struct AppState {
    /// The progress bar being driven
    pub progress: Mutex<ProgressController>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create a new AppState around an already configured controller
    pub fn new(port: u16, host: String, progress: ProgressController) -> Self {
        Self {
            progress: Mutex::new(progress),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Run an action against the controller and record it as the last action
    pub fn with_progress<F, T>(&self, action: &str, op: F) -> Result<T, String>
    where
        F: FnOnce(&mut ProgressController) -> T,
    {
        let mut progress = self.progress.lock()
            .map_err(|e| format!("Failed to lock progress controller: {}", e))?;

        let outcome = op(&mut *progress);
        drop(progress); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
        debug!("Action recorded: {}", action);

        Ok(outcome)
    }

    /// Get current progress status
    pub fn get_status(&self) -> Result<ProgressStatus, String> {
        self.progress.lock()
            .map(|progress| ProgressStatus::capture(&progress))
            .map_err(|e| format!("Failed to lock progress controller: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
