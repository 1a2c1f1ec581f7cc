//! Progress controller: turns countdown ticks into a progress fraction

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{
    appearance::{Appearance, Color},
    frame::ProgressFrame,
};
use crate::{
    countdown::{CountdownHandler, PausableCountdown},
    error::ProgressError,
};

/// Default tick cadence, one frame at roughly 60 fps.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Receives the elapsed time on every tick, typically to drive a redraw.
pub trait ProgressListener: Send + Sync + 'static {
    fn notify_elapsed(&self, elapsed: Duration);
}

#[derive(Debug)]
struct ProgressState {
    frame: ProgressFrame,
    last_divider_position: f32,
    /// Identifies the countdown whose ticks are currently accepted.
    generation: u64,
}

struct ProgressShared {
    state: Mutex<ProgressState>,
    listener: Mutex<Option<Arc<dyn ProgressListener>>>,
    frames_tx: watch::Sender<ProgressFrame>,
}

impl ProgressShared {
    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listener(&self) -> Option<Arc<dyn ProgressListener>> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Push the current frame to redraw subscribers
    fn publish(&self, state: &ProgressState) {
        self.frames_tx.send_replace(state.frame.clone());
    }

    fn update_elapsed(&self, generation: u64, elapsed: Duration, total: Duration) {
        if self.lock().generation != generation {
            return;
        }
        if let Some(listener) = self.listener() {
            listener.notify_elapsed(elapsed);
        }

        let fraction = if total.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0) as f32
        };

        let mut state = self.lock();
        if state.generation != generation {
            return;
        }
        state.frame.percent_complete = fraction;
        state.frame.elapsed_millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.publish(&state);
    }
}

/// Countdown callbacks for one auto-progress run
struct AutoProgress {
    shared: Arc<ProgressShared>,
    total: Duration,
    generation: u64,
}

impl CountdownHandler for AutoProgress {
    fn on_tick(&self, until_finished: Duration) {
        let elapsed = self.total.saturating_sub(until_finished);
        self.shared.update_elapsed(self.generation, elapsed, self.total);
    }

    fn on_finish(&self) {
        debug!("Auto progress complete after {}ms", self.total.as_millis());
        self.shared.update_elapsed(self.generation, self.total, self.total);
    }
}

/// A progress bar that fills itself over a configured duration.
///
/// The controller owns at most one [`PausableCountdown`] at a time and
/// replaces it wholesale on [`reset`](Self::reset). Progress can also be
/// set by hand with [`publish_progress`](Self::publish_progress).
pub struct ProgressController {
    shared: Arc<ProgressShared>,
    countdown: Option<PausableCountdown>,
    total_duration: Duration,
    tick_interval: Duration,
}

impl ProgressController {
    /// Create a controller ticking once per display frame
    pub fn new() -> Self {
        Self::with_tick_interval(FRAME_INTERVAL)
    }

    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        let frame = ProgressFrame::new();
        let (frames_tx, _) = watch::channel(frame.clone());
        Self {
            shared: Arc::new(ProgressShared {
                state: Mutex::new(ProgressState {
                    frame,
                    last_divider_position: 0.0,
                    generation: 0,
                }),
                listener: Mutex::new(None),
                frames_tx,
            }),
            countdown: None,
            total_duration: Duration::ZERO,
            tick_interval,
        }
    }

    /// Register the elapsed-time listener, replacing any previous one
    pub fn set_listener(&self, listener: Arc<dyn ProgressListener>) {
        *self.shared.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }

    /// Subscribe to redraw notifications
    pub fn subscribe(&self) -> watch::Receiver<ProgressFrame> {
        self.shared.frames_tx.subscribe()
    }

    /// Let the bar fill itself over `duration_millis`.
    ///
    /// The new countdown starts paused; call [`resume`](Self::resume) to run it.
    /// A negative duration is rejected and leaves everything as it was.
    pub fn enable_auto_progress(&mut self, duration_millis: i64) -> Result<(), ProgressError> {
        let Ok(millis) = u64::try_from(duration_millis) else {
            warn!("enable_auto_progress: time can not be negative ({}ms)", duration_millis);
            return Err(ProgressError::NegativeDuration(duration_millis));
        };
        self.start_countdown(Duration::from_millis(millis))
    }

    fn start_countdown(&mut self, total: Duration) -> Result<(), ProgressError> {
        self.total_duration = total;
        if let Some(previous) = self.countdown.take() {
            previous.cancel();
        }

        let generation = {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.generation
        };
        let handler = Arc::new(AutoProgress {
            shared: Arc::clone(&self.shared),
            total,
            generation,
        });

        let countdown = PausableCountdown::new(total, self.tick_interval, false, handler)
            .create()
            .map_err(|e| {
                error!("Failed to start auto progress: {}", e);
                e
            })?;
        info!("Auto progress enabled for {}ms", total.as_millis());
        self.countdown = Some(countdown);
        Ok(())
    }

    fn active_countdown(&self, action: &str) -> Result<&PausableCountdown, ProgressError> {
        self.countdown.as_ref().ok_or_else(|| {
            error!("{}: {}", action, ProgressError::NotConfigured);
            ProgressError::NotConfigured
        })
    }

    pub fn pause(&self) -> Result<(), ProgressError> {
        self.active_countdown("pause")?.pause();
        Ok(())
    }

    pub fn resume(&self) -> Result<(), ProgressError> {
        self.active_countdown("resume")?.resume();
        Ok(())
    }

    pub fn cancel(&self) -> Result<(), ProgressError> {
        self.active_countdown("cancel")?.cancel();
        Ok(())
    }

    /// Start over: fresh countdown with the same duration, no dividers, empty bar
    pub fn reset(&mut self) -> Result<(), ProgressError> {
        self.active_countdown("reset")?.cancel();
        info!("Resetting progress");
        let restarted = self.start_countdown(self.total_duration);

        // Cleared after the restart so a zero duration does not end up full.
        let mut state = self.shared.lock();
        state.frame.percent_complete = 0.0;
        state.frame.elapsed_millis = 0;
        state.frame.dividers.clear();
        state.last_divider_position = 0.0;
        self.shared.publish(&state);
        restarted
    }

    /// Set the completed fraction by hand, bypassing the countdown
    pub fn publish_progress(&self, value: f32) -> Result<(), ProgressError> {
        if !(0.0..=1.0).contains(&value) {
            warn!("publish_progress: progress value can only be between 0 and 1 (got {})", value);
            return Err(ProgressError::ProgressOutOfRange(value));
        }
        let mut state = self.shared.lock();
        state.frame.percent_complete = value;
        self.shared.publish(&state);
        Ok(())
    }

    /// Mark the current position with a divider.
    ///
    /// Returns false (and logs a warning) when a divider already sits at the
    /// current position.
    pub fn add_divider(&self) -> bool {
        let mut state = self.shared.lock();
        let position = state.frame.percent_complete;
        if state.last_divider_position == position {
            warn!("add_divider: divider already added to current position");
            return false;
        }
        state.last_divider_position = position;
        state.frame.dividers.push(position);
        debug!("Divider #{} added at {:.3}", state.frame.dividers.len(), position);
        self.shared.publish(&state);
        true
    }

    pub fn percent_complete(&self) -> f32 {
        self.shared.lock().frame.percent_complete
    }

    pub fn divider_positions(&self) -> Vec<f32> {
        self.shared.lock().frame.dividers.clone()
    }

    pub fn divider_count(&self) -> usize {
        self.shared.lock().frame.divider_count()
    }

    /// Snapshot of everything a renderer needs right now
    pub fn frame(&self) -> ProgressFrame {
        self.shared.lock().frame.clone()
    }

    pub fn countdown(&self) -> Option<&PausableCountdown> {
        self.countdown.as_ref()
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn appearance(&self) -> Appearance {
        self.shared.lock().frame.appearance.clone()
    }

    fn update_appearance<F>(&self, updater: F)
    where
        F: FnOnce(&mut Appearance),
    {
        let mut state = self.shared.lock();
        updater(&mut state.frame.appearance);
        self.shared.publish(&state);
    }

    pub fn set_progress_color(&self, color: Color) {
        self.update_appearance(|appearance| appearance.progress_color = color);
    }

    pub fn set_divider_color(&self, color: Color) {
        self.update_appearance(|appearance| appearance.divider_color = color);
    }

    pub fn set_divider_width(&self, width: f32) -> Result<(), ProgressError> {
        if width < 0.0 || width.is_nan() {
            warn!("set_divider_width: divider width can not be negative (got {})", width);
            return Err(ProgressError::NegativeDividerWidth(width));
        }
        self.update_appearance(|appearance| appearance.divider_width = width);
        Ok(())
    }

    pub fn set_dividers_enabled(&self, enabled: bool) {
        self.update_appearance(|appearance| appearance.dividers_enabled = enabled);
    }

    pub fn set_corner_radius(&self, radius: f32) {
        self.update_appearance(|appearance| appearance.corner_radius = radius);
    }

    /// Replace the flat progress color with a gradient
    pub fn set_gradient_colors(&self, colors: Vec<Color>) {
        self.update_appearance(|appearance| appearance.gradient_colors = colors);
    }
}

impl Default for ProgressController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressController {
    fn drop(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[derive(Default)]
    struct ElapsedLog(Mutex<Vec<Duration>>);

    impl ElapsedLog {
        fn entries(&self) -> Vec<Duration> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ProgressListener for ElapsedLog {
        fn notify_elapsed(&self, elapsed: Duration) {
            self.0.lock().unwrap().push(elapsed);
        }
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn time_left(controller: &ProgressController) -> Duration {
        controller.countdown().unwrap().time_left()
    }

    #[tokio::test(start_paused = true)]
    async fn enabled_progress_starts_paused() {
        for millis in [1, 250, 5_000] {
            let mut controller = ProgressController::new();
            controller.enable_auto_progress(millis).unwrap();
            sleep(ms(100)).await;
            assert_eq!(time_left(&controller), ms(millis as u64));
            assert_eq!(controller.percent_complete(), 0.0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_completes_immediately() {
        let mut controller = ProgressController::new();
        controller.enable_auto_progress(0).unwrap();
        assert_eq!(time_left(&controller), Duration::ZERO);
        assert_eq!(controller.percent_complete(), 1.0);
    }

    #[tokio::test]
    async fn negative_duration_is_rejected() {
        let mut controller = ProgressController::new();
        assert_eq!(
            controller.enable_auto_progress(-5),
            Err(ProgressError::NegativeDuration(-5))
        );
        assert!(controller.countdown().is_none());
        assert_eq!(controller.pause(), Err(ProgressError::NotConfigured));
    }

    #[test]
    fn controls_require_configuration() {
        let mut controller = ProgressController::new();
        assert_eq!(controller.pause(), Err(ProgressError::NotConfigured));
        assert_eq!(controller.resume(), Err(ProgressError::NotConfigured));
        assert_eq!(controller.cancel(), Err(ProgressError::NotConfigured));
        assert_eq!(controller.reset(), Err(ProgressError::NotConfigured));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_drive_progress_and_listener() {
        let mut controller = ProgressController::new();
        let log = Arc::new(ElapsedLog::default());
        controller.set_listener(log.clone());
        let frames = controller.subscribe();

        controller.enable_auto_progress(1_000).unwrap();
        controller.resume().unwrap();
        sleep(ms(500)).await;
        controller.pause().unwrap();

        let halfway = controller.percent_complete();
        assert!((0.45..=0.51).contains(&halfway), "progress: {halfway}");
        let elapsed = log.entries();
        assert!(!elapsed.is_empty());
        assert!(elapsed.windows(2).all(|pair| pair[0] <= pair[1]));

        controller.resume().unwrap();
        sleep(ms(1_000)).await;
        assert_eq!(controller.percent_complete(), 1.0);
        assert_eq!(log.entries().last(), Some(&ms(1_000)));
        assert!(frames.borrow().is_complete());
        assert_eq!(frames.borrow().elapsed_millis, 1_000);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_freezes_progress() {
        let mut controller = ProgressController::new();
        controller.enable_auto_progress(400).unwrap();
        controller.resume().unwrap();
        sleep(ms(100)).await;
        controller.cancel().unwrap();
        let frozen = controller.percent_complete();

        sleep(ms(1_000)).await;
        controller.resume().unwrap();
        sleep(ms(1_000)).await;
        assert_eq!(controller.percent_complete(), frozen);
        assert!(frozen < 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_divider_is_suppressed() {
        let mut controller = ProgressController::new();
        controller.enable_auto_progress(1_000).unwrap();
        assert!(!controller.add_divider());

        controller.publish_progress(0.3).unwrap();
        assert!(controller.add_divider());
        assert!(!controller.add_divider());
        assert_eq!(controller.divider_count(), 1);

        controller.publish_progress(0.6).unwrap();
        assert!(controller.add_divider());
        assert_eq!(controller.divider_positions(), vec![0.3, 0.6]);
    }

    #[test]
    fn out_of_range_progress_is_rejected() {
        let controller = ProgressController::new();
        controller.publish_progress(0.25).unwrap();
        assert_eq!(
            controller.publish_progress(1.5),
            Err(ProgressError::ProgressOutOfRange(1.5))
        );
        assert!(controller.publish_progress(-0.1).is_err());
        assert!(controller.publish_progress(f32::NAN).is_err());
        assert_eq!(controller.percent_complete(), 0.25);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_starts_over() {
        let mut controller = ProgressController::new();
        controller.enable_auto_progress(400).unwrap();
        controller.resume().unwrap();
        sleep(ms(100)).await;
        assert!(controller.add_divider());
        let old = controller.countdown().unwrap().clone();

        controller.reset().unwrap();
        assert!(old.is_cancelled());
        assert_eq!(controller.percent_complete(), 0.0);
        assert_eq!(controller.divider_count(), 0);
        assert_eq!(controller.frame().elapsed_millis, 0);
        assert_eq!(time_left(&controller), ms(400));

        sleep(ms(1_000)).await;
        assert_eq!(controller.percent_complete(), 0.0);

        controller.resume().unwrap();
        sleep(ms(1_000)).await;
        assert_eq!(controller.percent_complete(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_with_zero_duration_empties_bar() {
        let mut controller = ProgressController::new();
        let frames = controller.subscribe();
        controller.enable_auto_progress(0).unwrap();
        controller.publish_progress(0.4).unwrap();
        assert!(controller.add_divider());

        controller.reset().unwrap();
        assert_eq!(controller.percent_complete(), 0.0);
        assert_eq!(controller.divider_count(), 0);
        assert_eq!(frames.borrow().percent_complete, 0.0);
        assert!(controller.countdown().unwrap().is_finished());

        // The bar stays empty: the fresh countdown already finished.
        sleep(ms(100)).await;
        assert_eq!(controller.percent_complete(), 0.0);
    }

    #[test]
    fn negative_divider_width_is_rejected() {
        let controller = ProgressController::new();
        controller.set_divider_width(3.0).unwrap();
        assert_eq!(
            controller.set_divider_width(-1.0),
            Err(ProgressError::NegativeDividerWidth(-1.0))
        );
        assert_eq!(controller.appearance().divider_width, 3.0);
    }

    #[test]
    fn appearance_changes_reach_subscribers() {
        let controller = ProgressController::new();
        let frames = controller.subscribe();
        controller.set_dividers_enabled(true);
        controller.set_gradient_colors(vec![0xFF00_0000, 0xFFFF_FFFF]);
        let frame = frames.borrow();
        assert!(frame.appearance.dividers_enabled);
        assert_eq!(frame.appearance.gradient_colors.len(), 2);
    }
}
