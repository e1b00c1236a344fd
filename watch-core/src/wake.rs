//! Wake Channel
//!
//! Binary signal from the touch interrupt to the refresh task. Posting
//! masks the interrupt line before signalling, so a finger held on the
//! panel raises at most one wake per suspend.
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Interrupt line that can wake the refresh task.
pub trait WakeLine {
    fn set_interrupt_enabled(&mut self, enabled: bool);
}

pub struct WakeChannel {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for WakeChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeChannel {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Interrupt-context entry point: mask the line, then signal.
    ///
    /// Repeated posts before the waiter runs collapse into one wake.
    pub fn post_from_isr<L>(&self, line: &mut L)
    where
        L: WakeLine + ?Sized,
    {
        line.set_interrupt_enabled(false);
        self.signal.signal(());
    }

    /// Block the calling task until a wake is posted, consuming it.
    pub async fn wait(&self) {
        self.signal.wait().await;
    }

    /// Drop a pending wake.
    pub fn clear(&self) {
        self.signal.reset();
    }

    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }
}
