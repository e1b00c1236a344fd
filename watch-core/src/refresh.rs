//! Display Refresh Scheduler
//!
//! One cooperative loop owns the render pipeline and the power state.
//! While Active each iteration runs a render pass and sleeps for the
//! pipeline's suggested delay; once the inactivity timeout is reached the
//! loop hands over to the [`PowerController`] and parks on the
//! [`WakeChannel`] until the touch interrupt posts a wake.
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use log::{error, info};

use crate::config::SchedulerConfig;
use crate::power::{PowerController, PowerPhase, TickTimer};
use crate::wake::{WakeChannel, WakeLine};

/// Result of one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    /// Time until the toolkit next needs attention
    pub next_delay_ms: u32,
    /// Whether the pass consumed any user input
    pub had_input: bool,
}

/// The graphics toolkit as seen by the scheduler.
pub trait RenderPipeline {
    /// Advance the toolkit clock outside the periodic tick source.
    fn inject_tick(&mut self, elapsed_ms: u32);

    /// Dispatch pending input, run timers and animations, draw if dirty.
    fn run_pass(&mut self) -> PassOutcome;

    /// Low-rate hook, called every `slow_tick_ms` while Active.
    fn slow_tick(&mut self) {}
}

pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshState {
    Active,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshSchedule {
    pub inactive_time_ms: u64,
    pub next_delay_ms: u32,
    pub state: RefreshState,
}

/// What the loop does after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Sleep(u32),
    Suspend,
}

pub struct RefreshScheduler<P, B, T, L> {
    config: SchedulerConfig,
    pipeline: P,
    power: PowerController<B, T, L>,
    schedule: RefreshSchedule,
    last_activity_ms: u64,
    last_slow_tick_ms: u64,
}

impl<P, B, T, L> RefreshScheduler<P, B, T, L>
where
    P: RenderPipeline,
    B: OutputPin,
    T: TickTimer,
    L: WakeLine,
{
    pub fn new(config: SchedulerConfig, pipeline: P, power: PowerController<B, T, L>) -> Self {
        let config = config.validated();
        Self {
            config,
            pipeline,
            power,
            schedule: RefreshSchedule {
                inactive_time_ms: 0,
                next_delay_ms: config.min_delay_ms,
                state: RefreshState::Active,
            },
            last_activity_ms: 0,
            last_slow_tick_ms: 0,
        }
    }

    /// Bring the display up and start the inactivity clock at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        if let Err(e) = self.power.start() {
            error!("power start: {e:?}");
        }
        self.schedule.state = RefreshState::Active;
        self.last_activity_ms = now_ms;
        self.last_slow_tick_ms = now_ms;
        info!("refresh scheduler started");
    }

    /// Reset the inactivity clock.
    pub fn note_activity(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
        self.schedule.inactive_time_ms = 0;
    }

    /// One scheduling decision at `now_ms`.
    ///
    /// Active: runs a render pass and returns the clamped delay. Once the
    /// inactivity timeout is reached, suspends (once) and returns
    /// [`Step::Suspend`].
    pub fn step(&mut self, now_ms: u64, wake: &WakeChannel) -> Step {
        if self.schedule.state == RefreshState::Suspended {
            return Step::Suspend;
        }

        let inactive_ms = now_ms.saturating_sub(self.last_activity_ms);
        self.schedule.inactive_time_ms = inactive_ms;
        if inactive_ms >= self.config.idle_timeout_ms {
            info!("idle for {inactive_ms}ms, suspending");
            if let Err(e) = self.power.suspend(wake) {
                error!("suspend: {e:?}");
            }
            self.schedule.state = RefreshState::Suspended;
            return Step::Suspend;
        }

        let outcome = self.pipeline.run_pass();
        if outcome.had_input {
            self.note_activity(now_ms);
        }

        if now_ms.saturating_sub(self.last_slow_tick_ms) >= u64::from(self.config.slow_tick_ms) {
            self.last_slow_tick_ms = now_ms;
            self.pipeline.slow_tick();
        }

        let delay_ms = self.config.clamp_delay(outcome.next_delay_ms);
        self.schedule.next_delay_ms = delay_ms;
        Step::Sleep(delay_ms)
    }

    /// Leave Suspended after a wake: one catch-up tick and render, then
    /// tick timer and backlight back on.
    pub fn resume(&mut self, now_ms: u64) {
        if self.schedule.state != RefreshState::Suspended {
            return;
        }

        self.power.on_wake();
        self.pipeline.inject_tick(self.config.tick_period_ms);
        let outcome = self.pipeline.run_pass();
        if let Err(e) = self.power.finish_resume() {
            error!("resume: {e:?}");
        }

        self.schedule.state = RefreshState::Active;
        self.schedule.next_delay_ms = self.config.clamp_delay(outcome.next_delay_ms);
        self.note_activity(now_ms);
        self.last_slow_tick_ms = now_ms;
    }

    /// One loop iteration: render and sleep, or suspend and wait for a
    /// wake.
    pub async fn run_iteration<C, D>(&mut self, clock: &C, delay: &mut D, wake: &WakeChannel)
    where
        C: Clock,
        D: DelayNs,
    {
        match self.step(clock.now_ms(), wake) {
            Step::Sleep(ms) => delay.delay_ms(ms).await,
            Step::Suspend => {
                wake.wait().await;
                self.resume(clock.now_ms());
            }
        }
    }

    pub async fn run<C, D>(&mut self, clock: &C, delay: &mut D, wake: &WakeChannel) -> !
    where
        C: Clock,
        D: DelayNs,
    {
        self.start(clock.now_ms());
        loop {
            self.run_iteration(clock, delay, wake).await;
        }
    }

    pub fn schedule(&self) -> RefreshSchedule {
        self.schedule
    }

    pub fn phase(&self) -> PowerPhase {
        self.power.phase()
    }

    pub fn power(&self) -> &PowerController<B, T, L> {
        &self.power
    }

    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }
}
