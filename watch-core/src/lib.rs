#![cfg_attr(not(test), no_std)]
//! Touch-to-display core of the watch firmware.
//!
//! [`touch::TouchSampler`] polls the controller, [`gesture::GestureClassifier`]
//! turns samples into gestures, and [`refresh::RefreshScheduler`] drives the
//! render loop and the [`power::PowerController`] across idle suspend and
//! touch wake. The touch interrupt reaches the scheduler only through a
//! [`wake::WakeChannel`].

pub mod config;
pub mod gesture;
pub mod power;
pub mod refresh;
pub mod touch;
pub mod wake;

#[cfg(test)]
mod mock;

pub use config::{GestureConfig, SchedulerConfig, TouchConfig, DEFAULT_HISTORY_LEN};
pub use gesture::{Gesture, GestureCallback, GestureClassifier, GestureState, Gestures};
pub use power::{PowerController, PowerError, PowerPhase, PowerState, TickTimer};
pub use refresh::{
    Clock, PassOutcome, RefreshSchedule, RefreshScheduler, RefreshState, RenderPipeline, Step,
};
pub use touch::{PointerState, TouchSample, TouchSampler, TouchSource};
pub use wake::{WakeChannel, WakeLine};
