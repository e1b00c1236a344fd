//! Power State Controller
//!
//! | Current   | Trigger               | Action                                      | Next      |
//! |-----------|-----------------------|---------------------------------------------|-----------|
//! | Active    | inactivity >= timeout | stop tick timer, backlight off, unmask wake | Suspended |
//! | Suspended | touch interrupt       | mask wake (done by the interrupt handler)   | Resuming  |
//! | Resuming  | one tick + render     | restart tick timer, backlight on            | Active    |
use core::fmt::Debug;

use embedded_hal::digital::OutputPin;
use log::info;

use crate::wake::{WakeChannel, WakeLine};

/// Periodic source of toolkit ticks.
pub trait TickTimer {
    type Error: Debug;

    fn start_periodic(&mut self, interval_ms: u32) -> Result<(), Self::Error>;
    fn stop(&mut self) -> Result<(), Self::Error>;
    fn restart(&mut self, interval_ms: u32) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerState {
    pub backlight_on: bool,
    pub tick_timer_running: bool,
    pub touch_interrupt_enabled: bool,
}

impl PowerState {
    /// Either rendering (timer on, wake masked) or suspended (timer off,
    /// wake armed).
    pub fn is_consistent(&self) -> bool {
        self.tick_timer_running != self.touch_interrupt_enabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerPhase {
    Active,
    Suspended,
    Resuming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerError {
    Backlight,
    TickTimer,
}

pub struct PowerController<B, T, L> {
    backlight: B,
    timer: T,
    wake_line: L,
    tick_period_ms: u32,
    state: PowerState,
    phase: PowerPhase,
}

impl<B, T, L> PowerController<B, T, L>
where
    B: OutputPin,
    T: TickTimer,
    L: WakeLine,
{
    pub fn new(backlight: B, timer: T, wake_line: L, tick_period_ms: u32) -> Self {
        Self {
            backlight,
            timer,
            wake_line,
            tick_period_ms,
            state: PowerState::default(),
            phase: PowerPhase::Active,
        }
    }

    /// Enter Active from reset: tick timer running, backlight on, wake
    /// interrupt masked.
    pub fn start(&mut self) -> Result<(), PowerError> {
        self.wake_line.set_interrupt_enabled(false);
        self.state.touch_interrupt_enabled = false;

        let timer = self
            .timer
            .start_periodic(self.tick_period_ms)
            .map_err(|_| PowerError::TickTimer);
        self.state.tick_timer_running = true;

        let backlight = self.backlight.set_high().map_err(|_| PowerError::Backlight);
        self.state.backlight_on = true;

        self.phase = PowerPhase::Active;
        timer.and(backlight)
    }

    /// Active -> Suspended. Returns `Ok(false)` when not Active.
    ///
    /// A wake left over from the Active period is dropped before the line
    /// is armed, so only a touch after this call can resume.
    pub fn suspend(&mut self, wake: &WakeChannel) -> Result<bool, PowerError> {
        if self.phase != PowerPhase::Active {
            return Ok(false);
        }

        let timer = self.timer.stop().map_err(|_| PowerError::TickTimer);
        self.state.tick_timer_running = false;

        let backlight = self.backlight.set_low().map_err(|_| PowerError::Backlight);
        self.state.backlight_on = false;

        wake.clear();
        self.wake_line.set_interrupt_enabled(true);
        self.state.touch_interrupt_enabled = true;

        self.phase = PowerPhase::Suspended;
        info!("display suspended");
        timer.and(backlight).map(|()| true)
    }

    /// Suspended -> Resuming, after the interrupt handler posted a wake.
    ///
    /// The handler already masked the line; this only records it.
    pub fn on_wake(&mut self) -> bool {
        if self.phase != PowerPhase::Suspended {
            return false;
        }
        self.state.touch_interrupt_enabled = false;
        self.phase = PowerPhase::Resuming;
        true
    }

    /// Resuming -> Active once the catch-up tick and render have run.
    pub fn finish_resume(&mut self) -> Result<(), PowerError> {
        if self.phase != PowerPhase::Resuming {
            return Ok(());
        }

        let timer = self
            .timer
            .restart(self.tick_period_ms)
            .map_err(|_| PowerError::TickTimer);
        self.state.tick_timer_running = true;

        let backlight = self.backlight.set_high().map_err(|_| PowerError::Backlight);
        self.state.backlight_on = true;

        self.phase = PowerPhase::Active;
        info!("display resumed");
        timer.and(backlight)
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn phase(&self) -> PowerPhase {
        self.phase
    }
}
