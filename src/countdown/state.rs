//! Countdown state machine
//!
//! All time arithmetic lives here and takes `now` explicitly, so the driver in
//! [`super::timer`] only decides *when* to call into it.

use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle phase of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, `create` not called yet.
    Created,
    /// Stopped with `remaining` left on the clock.
    Paused { remaining: Duration },
    /// Counting down towards `deadline`.
    Running { deadline: Instant },
    /// Reached zero and fired its finish callback. Terminal.
    Finished,
}

/// What the driver has to do for a callback that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing was due (stale wake-up, paused or cancelled in the meantime).
    Idle,
    /// Less than one interval left; a final callback was scheduled without a tick.
    Settle(Duration),
    /// Deliver a tick with the given time until finished.
    Tick(Duration),
    /// Time is up; deliver the finish callback.
    Finish,
}

/// Timing state of a single countdown
#[derive(Debug, Clone)]
pub struct CountdownState {
    total: Duration,
    tick_interval: Duration,
    phase: Phase,
    /// When the driver should next call [`CountdownState::begin_step`].
    next_fire: Option<Instant>,
    cancelled: bool,
    started: bool,
    /// Bumped on every external transition so a tick in flight can tell it went stale.
    epoch: u64,
}

impl CountdownState {
    /// Create state for a countdown that has not been started
    pub fn new(total: Duration, tick_interval: Duration) -> Self {
        Self {
            total,
            tick_interval,
            phase: Phase::Created,
            next_fire: None,
            cancelled: false,
            started: false,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn next_fire(&self) -> Option<Instant> {
        self.next_fire
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn has_been_started(&self) -> bool {
        self.started
    }

    /// Whether a driver still has work to do for this countdown
    pub fn is_live(&self) -> bool {
        !self.cancelled && self.phase != Phase::Finished
    }

    /// Leave `Created`. A zero total goes straight to `Finished`, anything
    /// else starts paused with the full duration remaining.
    ///
    /// Returns the resulting phase; calling it again is a no-op.
    pub fn create(&mut self) -> Phase {
        if self.phase == Phase::Created {
            self.phase = if self.total.is_zero() {
                Phase::Finished
            } else {
                Phase::Paused { remaining: self.total }
            };
        }
        self.phase
    }

    /// Freeze the remaining time. Returns false when there was nothing to pause.
    pub fn pause(&mut self, now: Instant) -> bool {
        let Phase::Running { deadline } = self.phase else {
            return false;
        };
        let remaining = deadline.saturating_duration_since(now);
        if remaining.is_zero() {
            // Already due; let the pending callback deliver the finish.
            return false;
        }
        self.phase = Phase::Paused { remaining };
        self.next_fire = None;
        self.epoch += 1;
        true
    }

    /// Start running from the frozen remaining time and ask for an immediate
    /// evaluation. Returns false when not paused or already cancelled.
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.cancelled {
            return false;
        }
        let Phase::Paused { remaining } = self.phase else {
            return false;
        };
        self.phase = Phase::Running {
            deadline: now + remaining,
        };
        self.next_fire = Some(now);
        self.started = true;
        self.epoch += 1;
        true
    }

    /// Drop any pending callback for good. Returns true only the first time.
    pub fn cancel(&mut self) -> bool {
        let first = !self.cancelled;
        self.cancelled = true;
        self.next_fire = None;
        self.epoch += 1;
        first
    }

    pub fn time_left(&self, now: Instant) -> Duration {
        match self.phase {
            Phase::Created => self.total,
            Phase::Paused { remaining } => remaining,
            Phase::Running { deadline } => deadline.saturating_duration_since(now),
            Phase::Finished => Duration::ZERO,
        }
    }

    pub fn time_passed(&self, now: Instant) -> Duration {
        self.total.saturating_sub(self.time_left(now))
    }

    /// Evaluate a due callback and decide what the driver delivers.
    pub fn begin_step(&mut self, now: Instant) -> Step {
        if self.cancelled || !matches!(self.phase, Phase::Running { .. }) {
            return Step::Idle;
        }
        match self.next_fire {
            Some(at) if at <= now => self.next_fire = None,
            _ => return Step::Idle,
        }

        let left = self.time_left(now);
        if left.is_zero() {
            self.phase = Phase::Finished;
            self.epoch += 1;
            Step::Finish
        } else if left < self.tick_interval {
            self.next_fire = Some(now + left);
            Step::Settle(left)
        } else {
            Step::Tick(left)
        }
    }

    /// Schedule the callback after a delivered tick, unless the countdown was
    /// paused, resumed or cancelled while the tick ran.
    pub fn end_tick(&mut self, epoch: u64, now: Instant, tick_took: Duration) -> bool {
        if epoch != self.epoch || self.cancelled || !matches!(self.phase, Phase::Running { .. }) {
            return false;
        }
        self.next_fire = Some(now + next_tick_delay(self.tick_interval, tick_took));
        true
    }
}

/// Delay until the next tick after a tick handler ran for `tick_took`.
///
/// A handler slower than one interval skips the missed ticks: the result is
/// pushed forward by whole intervals until it is no longer negative.
pub fn next_tick_delay(interval: Duration, tick_took: Duration) -> Duration {
    if tick_took <= interval {
        return interval - tick_took;
    }
    let interval_nanos = interval.as_nanos();
    if interval_nanos == 0 {
        return Duration::ZERO;
    }
    let overshoot = tick_took.as_nanos() % interval_nanos;
    if overshoot == 0 {
        Duration::ZERO
    } else {
        Duration::from_nanos(u64::try_from(interval_nanos - overshoot).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn delay_compensates_for_tick_duration() {
        assert_eq!(next_tick_delay(ms(100), ms(0)), ms(100));
        assert_eq!(next_tick_delay(ms(100), ms(30)), ms(70));
        assert_eq!(next_tick_delay(ms(100), ms(100)), ms(0));
    }

    #[test]
    fn slow_tick_skips_to_next_interval() {
        assert_eq!(next_tick_delay(ms(100), ms(250)), ms(50));
        assert_eq!(next_tick_delay(ms(100), ms(200)), ms(0));
        assert_eq!(next_tick_delay(ms(16), ms(40)), ms(8));
    }

    #[test]
    fn zero_total_finishes_on_create() {
        let mut state = CountdownState::new(Duration::ZERO, ms(16));
        assert_eq!(state.create(), Phase::Finished);
        assert!(!state.is_live());
        assert_eq!(state.time_left(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn created_countdown_starts_paused() {
        let mut state = CountdownState::new(ms(500), ms(16));
        let now = Instant::now();
        assert_eq!(state.time_left(now), ms(500));
        assert_eq!(state.create(), Phase::Paused { remaining: ms(500) });
        assert!(!state.has_been_started());
        assert!(!state.pause(now));
        assert_eq!(state.time_left(now), ms(500));
    }

    #[test]
    fn pause_carries_remaining_time_over() {
        let mut state = CountdownState::new(ms(500), ms(16));
        state.create();
        let start = Instant::now();
        assert!(state.resume(start));
        assert!(state.has_been_started());
        assert!(!state.resume(start));

        assert!(state.pause(start + ms(200)));
        assert_eq!(state.time_left(start + ms(10_000)), ms(300));
        assert_eq!(state.next_fire(), None);

        let later = start + ms(10_000);
        assert!(state.resume(later));
        assert_eq!(state.time_left(later + ms(100)), ms(200));
        assert_eq!(state.time_passed(later + ms(100)), ms(300));
    }

    #[test]
    fn short_tail_settles_without_tick() {
        let mut state = CountdownState::new(ms(250), ms(100));
        state.create();
        let start = Instant::now();
        state.resume(start);

        assert_eq!(state.begin_step(start), Step::Tick(ms(250)));
        assert!(state.end_tick(state.epoch(), start, Duration::ZERO));
        assert_eq!(state.begin_step(start + ms(100)), Step::Tick(ms(150)));
        assert!(state.end_tick(state.epoch(), start + ms(100), Duration::ZERO));
        assert_eq!(state.begin_step(start + ms(200)), Step::Settle(ms(50)));
        assert_eq!(state.next_fire(), Some(start + ms(250)));
        assert_eq!(state.begin_step(start + ms(250)), Step::Finish);
        assert_eq!(state.phase(), Phase::Finished);
        assert_eq!(state.begin_step(start + ms(300)), Step::Idle);
    }

    #[test]
    fn tick_in_flight_goes_stale_on_pause() {
        let mut state = CountdownState::new(ms(1_000), ms(100));
        state.create();
        let start = Instant::now();
        state.resume(start);

        assert_eq!(state.begin_step(start), Step::Tick(ms(1_000)));
        let epoch = state.epoch();
        state.pause(start + ms(5));
        assert!(!state.end_tick(epoch, start + ms(5), ms(5)));
        assert_eq!(state.next_fire(), None);
    }

    #[test]
    fn step_before_due_is_idle() {
        let mut state = CountdownState::new(ms(1_000), ms(100));
        state.create();
        let start = Instant::now();
        state.resume(start);
        state.begin_step(start);
        state.end_tick(state.epoch(), start, Duration::ZERO);
        assert_eq!(state.begin_step(start + ms(50)), Step::Idle);
    }

    #[test]
    fn cancel_is_idempotent_and_blocks_resume() {
        let mut state = CountdownState::new(ms(1_000), ms(100));
        state.create();
        assert!(state.cancel());
        assert!(!state.cancel());
        assert!(!state.resume(Instant::now()));
        assert!(!state.is_live());
        assert_eq!(state.time_left(Instant::now()), ms(1_000));
    }
}
