//! Countdown driver task and its public handle

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tokio::{
    runtime::Handle,
    sync::watch,
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

use super::state::{CountdownState, Phase, Step};
use crate::error::ProgressError;

/// Callbacks delivered by a [`PausableCountdown`].
///
/// Calls for one countdown never overlap: the next callback is only scheduled
/// once the previous one returned.
pub trait CountdownHandler: Send + Sync + 'static {
    /// Fired once per interval with the time left until finish.
    fn on_tick(&self, until_finished: Duration);

    /// Fired exactly once when the countdown reaches zero.
    fn on_finish(&self);
}

struct Shared {
    state: Mutex<CountdownState>,
    handler: Arc<dyn CountdownHandler>,
    /// Wakes the driver whenever the schedule changed under it.
    wake_tx: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CountdownState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wake(&self) {
        self.wake_tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Run one due callback. The state lock is never held while user code runs.
    fn fire(&self) {
        let (step, epoch) = {
            let mut state = self.lock();
            (state.begin_step(Instant::now()), state.epoch())
        };

        match step {
            Step::Idle => {}
            Step::Settle(left) => {
                debug!(
                    "Less than one interval left ({}ms), settling without tick",
                    left.as_millis()
                );
            }
            Step::Finish => {
                info!("Countdown finished");
                self.handler.on_finish();
            }
            Step::Tick(left) => {
                let tick_start = Instant::now();
                self.handler.on_tick(left);
                let tick_took = tick_start.elapsed();

                let interval = self.lock().tick_interval();
                if tick_took > interval {
                    debug!(
                        "Tick took {}ms, longer than the {}ms interval; skipping missed ticks",
                        tick_took.as_millis(),
                        interval.as_millis()
                    );
                }
                self.lock().end_tick(epoch, Instant::now(), tick_took);
            }
        }
    }
}

/// A countdown that can be paused and resumed any number of times.
///
/// Handles are cheap to clone and all point at the same countdown. Dropping
/// every handle stops the countdown silently.
#[derive(Clone)]
pub struct PausableCountdown {
    shared: Arc<Shared>,
    run_immediately: bool,
}

impl PausableCountdown {
    /// Configure a countdown. Nothing runs until [`create`](Self::create).
    pub fn new(
        total: Duration,
        tick_interval: Duration,
        run_immediately: bool,
        handler: Arc<dyn CountdownHandler>,
    ) -> Self {
        let (wake_tx, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CountdownState::new(total, tick_interval)),
                handler,
                wake_tx,
            }),
            run_immediately,
        }
    }

    /// Initialise the countdown.
    ///
    /// A zero total fires `on_finish` right here and leaves the countdown
    /// inert. Otherwise the countdown starts paused (or running, when
    /// configured to run immediately) and a driver task is spawned on the
    /// current tokio runtime.
    pub fn create(self) -> Result<Self, ProgressError> {
        let (phase, total, interval) = {
            let state = self.shared.lock();
            (state.phase(), state.total(), state.tick_interval())
        };
        if phase != Phase::Created {
            warn!("Countdown already created, ignoring");
            return Ok(self);
        }
        if interval.is_zero() {
            warn!("Refusing to create countdown: {}", ProgressError::ZeroTickInterval);
            return Err(ProgressError::ZeroTickInterval);
        }

        if total.is_zero() {
            self.shared.lock().create();
            info!("Countdown created with zero duration, finishing immediately");
            self.shared.handler.on_finish();
            return Ok(self);
        }

        let runtime = Handle::try_current().map_err(|e| {
            warn!("Refusing to create countdown: {}", e);
            ProgressError::NoRuntime
        })?;

        self.shared.lock().create();
        let wake_rx = self.shared.wake_tx.subscribe();
        runtime.spawn(drive(Arc::downgrade(&self.shared), wake_rx));
        debug!(
            "Countdown created: total={}ms, interval={}ms, run_immediately={}",
            total.as_millis(),
            interval.as_millis(),
            self.run_immediately
        );

        if self.run_immediately {
            self.resume();
        }
        Ok(self)
    }

    /// Pause the countdown, keeping the remaining time. No-op unless running.
    pub fn pause(&self) {
        let paused = self.shared.lock().pause(Instant::now());
        if paused {
            debug!("Countdown paused with {}ms left", self.time_left().as_millis());
            self.shared.wake();
        }
    }

    /// Resume a paused countdown. The first evaluation happens right away.
    pub fn resume(&self) {
        let resumed = self.shared.lock().resume(Instant::now());
        if resumed {
            debug!("Countdown resumed with {}ms left", self.time_left().as_millis());
            self.shared.wake();
        } else if self.is_cancelled() {
            debug!("Ignoring resume on a cancelled countdown");
        }
    }

    /// Stop delivering callbacks for good, without firing `on_finish`.
    pub fn cancel(&self) {
        if self.shared.lock().cancel() {
            debug!("Countdown cancelled");
            self.shared.wake();
        }
    }

    pub fn time_left(&self) -> Duration {
        self.shared.lock().time_left(Instant::now())
    }

    pub fn total_countdown(&self) -> Duration {
        self.shared.lock().total()
    }

    pub fn time_passed(&self) -> Duration {
        self.shared.lock().time_passed(Instant::now())
    }

    /// True once the countdown has been resumed at least once
    pub fn has_been_started(&self) -> bool {
        self.shared.lock().has_been_started()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase()
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase(), Phase::Paused { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase(), Phase::Running { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == Phase::Finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.lock().is_cancelled()
    }

    pub fn tick_interval(&self) -> Duration {
        self.shared.lock().tick_interval()
    }
}

/// Single serialized execution context for one countdown's callbacks.
async fn drive(shared: Weak<Shared>, mut wake_rx: watch::Receiver<u64>) {
    debug!("Countdown driver started");

    loop {
        let next_fire = match shared.upgrade() {
            Some(shared) => {
                let state = shared.lock();
                if !state.is_live() {
                    break;
                }
                state.next_fire()
            }
            None => break,
        };

        match next_fire {
            Some(at) => {
                tokio::select! {
                    _ = sleep_until(at) => {
                        let Some(shared) = shared.upgrade() else { break };
                        shared.fire();
                    }
                    changed = wake_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            None => {
                if wake_rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Countdown driver stopped");
}
