//! Progress status reported to clients

use serde::{Deserialize, Serialize};

use crate::{countdown::Phase, progress::{ProgressController, ProgressFrame}};

/// Point-in-time view of the controller and its countdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressStatus {
    pub frame: ProgressFrame,
    /// False until auto progress has been enabled
    pub configured: bool,
    pub phase: String,
    pub started: bool,
    pub cancelled: bool,
    pub total_millis: u64,
    pub time_left_millis: Option<u64>,
    pub time_passed_millis: Option<u64>,
}

impl ProgressStatus {
    /// Capture the current status of a controller
    pub fn capture(controller: &ProgressController) -> Self {
        let frame = controller.frame();
        let total_millis = millis(controller.total_duration());

        match controller.countdown() {
            Some(countdown) => Self {
                frame,
                configured: true,
                phase: phase_name(countdown.phase()).to_string(),
                started: countdown.has_been_started(),
                cancelled: countdown.is_cancelled(),
                total_millis,
                time_left_millis: Some(millis(countdown.time_left())),
                time_passed_millis: Some(millis(countdown.time_passed())),
            },
            None => Self::unconfigured(frame, total_millis),
        }
    }

    fn unconfigured(frame: ProgressFrame, total_millis: u64) -> Self {
        Self {
            frame,
            configured: false,
            phase: "unconfigured".to_string(),
            started: false,
            cancelled: false,
            total_millis,
            time_left_millis: None,
            time_passed_millis: None,
        }
    }
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Created => "created",
        Phase::Paused { .. } => "paused",
        Phase::Running { .. } => "running",
        Phase::Finished => "finished",
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_controller_has_no_times() {
        let status = ProgressStatus::capture(&ProgressController::new());
        assert!(!status.configured);
        assert_eq!(status.phase, "unconfigured");
        assert_eq!(status.time_left_millis, None);
    }

    #[tokio::test(start_paused = true)]
    async fn captures_paused_countdown() {
        let mut controller = ProgressController::new();
        controller.enable_auto_progress(1_500).unwrap();
        let status = ProgressStatus::capture(&controller);
        assert_eq!(status.phase, "paused");
        assert_eq!(status.total_millis, 1_500);
        assert_eq!(status.time_left_millis, Some(1_500));
        assert_eq!(status.time_passed_millis, Some(0));

        controller.resume().unwrap();
        let status = ProgressStatus::capture(&controller);
        assert_eq!(status.phase, "running");
        assert!(status.started);
    }
}
