//! Call-recording stand-ins for the board peripherals and the toolkit.
use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_async::delay::DelayNs;
use std::rc::Rc;

use crate::power::{PowerController, TickTimer};
use crate::refresh::{Clock, PassOutcome, RenderPipeline};
use crate::wake::WakeLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Backlight(bool),
    TimerStart(u32),
    TimerStop,
    TimerRestart(u32),
    WakeLine(bool),
    Tick(u32),
    Pass,
    SlowTick,
}

pub type Log = Rc<RefCell<Vec<Call>>>;

pub fn count(log: &Log, call: Call) -> usize {
    log.borrow().iter().filter(|c| **c == call).count()
}

#[derive(Clone)]
pub struct Backlight(pub Log);

impl ErrorType for Backlight {
    type Error = Infallible;
}

impl OutputPin for Backlight {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Call::Backlight(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Call::Backlight(true));
        Ok(())
    }
}

#[derive(Clone)]
pub struct Timer {
    pub log: Log,
    pub fail: bool,
}

impl Timer {
    fn record(&self, call: Call) -> Result<(), &'static str> {
        self.log.borrow_mut().push(call);
        if self.fail {
            Err("timer")
        } else {
            Ok(())
        }
    }
}

impl TickTimer for Timer {
    type Error = &'static str;

    fn start_periodic(&mut self, interval_ms: u32) -> Result<(), Self::Error> {
        self.record(Call::TimerStart(interval_ms))
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.record(Call::TimerStop)
    }

    fn restart(&mut self, interval_ms: u32) -> Result<(), Self::Error> {
        self.record(Call::TimerRestart(interval_ms))
    }
}

#[derive(Clone)]
pub struct Line(pub Log);

impl WakeLine for Line {
    fn set_interrupt_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().push(Call::WakeLine(enabled));
    }
}

pub type Controller = PowerController<Backlight, Timer, Line>;

pub fn controller(log: &Log) -> Controller {
    PowerController::new(
        Backlight(log.clone()),
        Timer {
            log: log.clone(),
            fail: false,
        },
        Line(log.clone()),
        33,
    )
}

pub struct Pipeline {
    log: Log,
    pub next_delay_ms: u32,
    pub input: bool,
}

impl Pipeline {
    pub fn new(log: &Log, next_delay_ms: u32) -> Self {
        Self {
            log: log.clone(),
            next_delay_ms,
            input: false,
        }
    }
}

impl RenderPipeline for Pipeline {
    fn inject_tick(&mut self, elapsed_ms: u32) {
        self.log.borrow_mut().push(Call::Tick(elapsed_ms));
    }

    fn run_pass(&mut self) -> PassOutcome {
        self.log.borrow_mut().push(Call::Pass);
        PassOutcome {
            next_delay_ms: self.next_delay_ms,
            had_input: self.input,
        }
    }

    fn slow_tick(&mut self) {
        self.log.borrow_mut().push(Call::SlowTick);
    }
}

#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Delay that returns at once and moves the clock forward instead.
pub struct ClockDelay(pub ManualClock);

impl DelayNs for ClockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.advance(u64::from(ns / 1_000_000));
    }

    async fn delay_us(&mut self, us: u32) {
        self.0.advance(u64::from(us / 1_000));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.advance(u64::from(ms));
    }
}
