//! Redraw background task

use std::time::Duration;
use tokio::{sync::watch, time::interval};
use tracing::{info, trace};

use crate::progress::{render_text_bar, ProgressFrame, ProgressListener};

/// How often the redraw task samples the latest frame
pub const REDRAW_CADENCE: Duration = Duration::from_millis(250);

/// Background task that draws the bar into the log whenever it changed.
///
/// Frames arrive at tick rate; only the newest one is drawn per cadence.
pub async fn redraw_task(
    mut frames: watch::Receiver<ProgressFrame>,
    columns: usize,
    cadence: Duration,
) {
    info!("Starting redraw task");

    let mut interval = interval(cadence);

    loop {
        interval.tick().await;

        match frames.has_changed() {
            Ok(true) => {
                let frame = frames.borrow_and_update().clone();
                info!("{}", render_text_bar(&frame, columns));
                if frame.is_complete() {
                    info!("Progress complete with {} dividers", frame.divider_count());
                }
            }
            Ok(false) => {
                // Nothing new since the last draw
            }
            Err(_) => {
                info!("Progress controller dropped, stopping redraw task");
                break;
            }
        }
    }
}

/// Listener that traces every elapsed-time notification
pub struct ElapsedTracer;

impl ProgressListener for ElapsedTracer {
    fn notify_elapsed(&self, elapsed: Duration) {
        trace!("Elapsed: {}ms", elapsed.as_millis());
    }
}
