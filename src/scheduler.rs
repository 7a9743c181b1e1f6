//! The auto-click scheduler.
//!
//! [`ClickScheduler`] owns the running/stopped state machine, the repeat timer
//! and hold bookkeeping. It never runs on its own: the application loop feeds
//! it commands and the [`Tick`]s produced by its timer, one at a time, so the
//! state needs no locking.
//!
//! ```text
//! Stopped --start--> Running --stop / Times(n) reached--> Stopped
//! ```

use crate::commands::Notification;
use crate::error::{ClickerError, Result};
use crate::input::{InputDriver, MouseButton};
use crate::profile::{ClickType, RepeatPolicy};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Parameters of one click job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickJob {
    pub button: MouseButton,
    pub click_type: ClickType,
    pub repeat: RepeatPolicy,
    pub interval: Duration,
}

/// Timer wake-up, stamped with the generation of the job that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

/// In-memory scheduler flags. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    pub running: bool,
    pub current_count: u32,
    pub held_button: Option<MouseButton>,
}

impl SchedulerState {
    pub fn is_holding(&self) -> bool {
        self.held_button.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Continue,
    Finished,
}

/// Repeating timer task. Dropping it cancels the task.
struct RepeatTimer {
    handle: JoinHandle<()>,
}

impl RepeatTimer {
    fn spawn(period: Duration, generation: u64, ticks: mpsc::Sender<Tick>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                // A full queue means the previous tick is still pending; skip this one.
                if let Err(mpsc::error::TrySendError::Closed(_)) =
                    ticks.try_send(Tick { generation })
                {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for RepeatTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct ActiveJob {
    job: ClickJob,
    timer: Option<RepeatTimer>,
}

pub struct ClickScheduler<D> {
    driver: D,
    state: SchedulerState,
    active: Option<ActiveJob>,
    generation: u64,
    min_interval: Duration,
    ticks: mpsc::Sender<Tick>,
}

impl<D: InputDriver> ClickScheduler<D> {
    /// Creates a stopped scheduler and the receiver its timer ticks arrive on.
    ///
    /// `min_interval` is the floor applied to job intervals; a zero interval
    /// means "as fast as the timer allows".
    pub fn new(driver: D, min_interval: Duration) -> (Self, mpsc::Receiver<Tick>) {
        let (ticks, rx) = mpsc::channel(1);
        let scheduler = Self {
            driver,
            state: SchedulerState::default(),
            active: None,
            generation: 0,
            min_interval: min_interval.max(Duration::from_millis(1)),
            ticks,
        };
        (scheduler, rx)
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SchedulerState {
        &mut self.state
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Whether a job is armed (timer running or hold outstanding).
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Runs one cycle immediately, then arms the repeat timer.
    ///
    /// Returns the self-stop notification when the first cycle already
    /// completes the job (`Times(1)`). Fails with
    /// [`ClickerError::AlreadyRunning`] if a job is active.
    pub fn start(&mut self, job: ClickJob) -> Result<Option<Notification>> {
        if self.active.is_some() {
            return Err(ClickerError::AlreadyRunning);
        }

        info!(
            button = %job.button,
            click_type = job.click_type.as_str(),
            repeat = ?job.repeat,
            interval_ms = job.interval.as_millis() as u64,
            "Starting click job"
        );

        self.state.running = true;
        self.generation += 1;
        self.active = Some(ActiveJob { job, timer: None });

        if self.run_cycle(&job) == CycleOutcome::Finished {
            return Ok(Some(self.finish()));
        }

        let period = job.interval.max(self.min_interval);
        let timer = RepeatTimer::spawn(period, self.generation, self.ticks.clone());
        if let Some(active) = self.active.as_mut() {
            active.timer = Some(timer);
        }
        Ok(None)
    }

    /// Handles a timer tick. Ticks from a cancelled job are ignored.
    pub fn on_tick(&mut self, tick: Tick) -> Option<Notification> {
        if tick.generation != self.generation {
            debug!(tick = tick.generation, current = self.generation, "Dropping stale tick");
            return None;
        }
        let job = self.active.as_ref()?.job;

        match self.run_cycle(&job) {
            CycleOutcome::Continue => None,
            CycleOutcome::Finished => Some(self.finish()),
        }
    }

    /// User-initiated stop. Safe to call in any state.
    ///
    /// Releases a held button, cancels the timer and resets the cycle count.
    /// The `running` flag is left to the caller.
    pub fn stop(&mut self) {
        self.release_hold();
        if self.active.take().is_some() {
            info!("Click job stopped");
        }
        self.generation += 1;
        self.state.current_count = 0;
    }

    fn finish(&mut self) -> Notification {
        self.active = None;
        self.generation += 1;
        self.release_hold();
        self.state.current_count = 0;
        self.state.running = false;
        info!("Click job finished");
        Notification::AutoclickStopped { success: true }
    }

    fn run_cycle(&mut self, job: &ClickJob) -> CycleOutcome {
        match job.click_type {
            ClickType::Single => self.emit_click(job.button),
            ClickType::Double => {
                self.emit_click(job.button);
                self.emit_click(job.button);
            }
            ClickType::Hold => {
                if !self.state.is_holding() {
                    if let Err(e) = self.driver.press(job.button) {
                        warn!("Failed to press {}: {}", job.button, e);
                    }
                    self.state.held_button = Some(job.button);
                }
            }
        }

        match job.repeat {
            RepeatPolicy::Loop => CycleOutcome::Continue,
            RepeatPolicy::Times(n) => {
                self.state.current_count += 1;
                if self.state.current_count >= n {
                    CycleOutcome::Finished
                } else {
                    CycleOutcome::Continue
                }
            }
        }
    }

    fn emit_click(&mut self, button: MouseButton) {
        if let Err(e) = self.driver.click(button) {
            warn!("Failed to click {}: {}", button, e);
        }
    }

    fn release_hold(&mut self) {
        if let Some(button) = self.state.held_button.take() {
            if let Err(e) = self.driver.release(button) {
                warn!("Failed to release {}: {}", button, e);
            }
        }
    }
}
