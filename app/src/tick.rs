//! Toolkit tick source
//!
//! slint reads its time from [`toolkit_millis`], which only moves while
//! the periodic tick task is running (plus any explicit [`advance`]).
//! Stopping the timer on suspend therefore freezes slint timers and
//! animations until the display is resumed.

use core::cell::Cell;
use core::convert::Infallible;

use critical_section::Mutex;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use watch_core::TickTimer;

static TOOLKIT_MS: Mutex<Cell<u64>> = Mutex::new(Cell::new(0));

static TICK_CONTROL: Signal<CriticalSectionRawMutex, TickCommand> = Signal::new();

#[derive(Debug, Clone, Copy)]
enum TickCommand {
    Start(u32),
    Stop,
}

pub fn toolkit_millis() -> u64 {
    critical_section::with(|cs| TOOLKIT_MS.borrow(cs).get())
}

pub fn advance(elapsed_ms: u32) {
    critical_section::with(|cs| {
        let now = TOOLKIT_MS.borrow(cs);
        now.set(now.get() + u64::from(elapsed_ms));
    });
}

#[embassy_executor::task]
pub async fn tick_task() {
    let mut period_ms: Option<u32> = None;
    loop {
        let command = match period_ms {
            Some(ms) => match select(TICK_CONTROL.wait(), Timer::after_millis(ms.into())).await {
                Either::First(command) => command,
                Either::Second(()) => {
                    advance(ms);
                    continue;
                }
            },
            None => TICK_CONTROL.wait().await,
        };

        period_ms = match command {
            TickCommand::Start(ms) => Some(ms.max(1)),
            TickCommand::Stop => None,
        };
    }
}

/// Control handle for [`tick_task`].
pub struct EmbassyTickTimer;

impl TickTimer for EmbassyTickTimer {
    type Error = Infallible;

    fn start_periodic(&mut self, interval_ms: u32) -> Result<(), Self::Error> {
        TICK_CONTROL.signal(TickCommand::Start(interval_ms));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        TICK_CONTROL.signal(TickCommand::Stop);
        Ok(())
    }

    fn restart(&mut self, interval_ms: u32) -> Result<(), Self::Error> {
        self.start_periodic(interval_ms)
    }
}
