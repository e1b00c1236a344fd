//! Gesture Classifier
//!
//! Derives semantic gestures from raw controller phases using a single
//! press/lift timestamp pair: a hold that stays put for longer than
//! `drag_arm_ms` becomes a drag, a release within `tap_window_ms` that
//! never became a drag is a tap. Once a drag has started the touch can no
//! longer end as a tap.
use drivers::ft5436::{RawEvent, TouchPoint};
use heapless::HistoryBuffer;
use log::debug;

use crate::config::{GestureConfig, DEFAULT_HISTORY_LEN};
use crate::touch::TouchSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    TouchStart,
    TouchMove,
    TouchEnd,
    Tap,
    DragStart,
    DragMove,
    DragEnd,
}

/// Registered receiver for emitted gestures.
///
/// Runs in task context, inline with [`GestureClassifier::process`].
pub type GestureCallback = fn(Gesture, TouchPoint);

/// Upper bound of gestures a single sample can produce
pub const MAX_GESTURES_PER_SAMPLE: usize = 3;

pub type Gestures = heapless::Vec<Gesture, MAX_GESTURES_PER_SAMPLE>;

#[derive(Debug, Clone)]
pub struct GestureState<const N: usize> {
    pub last_event: RawEvent,
    pub last_x: u16,
    pub last_y: u16,
    pub drag_active: bool,
    pub touch_active: bool,
    pub touch_start_ms: u64,
    pub last_activity_ms: u64,
    history: HistoryBuffer<TouchPoint, N>,
}

impl<const N: usize> GestureState<N> {
    const fn new() -> Self {
        Self {
            last_event: RawEvent::NoEvent,
            last_x: 0,
            last_y: 0,
            drag_active: false,
            touch_active: false,
            touch_start_ms: 0,
            last_activity_ms: 0,
            history: HistoryBuffer::new(),
        }
    }

    /// Points of the current touch, oldest first
    pub fn history(&self) -> impl Iterator<Item = &TouchPoint> {
        self.history.oldest_ordered()
    }
}

impl<const N: usize> PartialEq for GestureState<N> {
    fn eq(&self, other: &Self) -> bool {
        self.last_event == other.last_event
            && self.last_x == other.last_x
            && self.last_y == other.last_y
            && self.drag_active == other.drag_active
            && self.touch_active == other.touch_active
            && self.touch_start_ms == other.touch_start_ms
            && self.last_activity_ms == other.last_activity_ms
            && self.history().eq(other.history())
    }
}

pub struct GestureClassifier<const N: usize = DEFAULT_HISTORY_LEN> {
    config: GestureConfig,
    state: GestureState<N>,
    handler: Option<GestureCallback>,
}

impl GestureClassifier<DEFAULT_HISTORY_LEN> {
    pub fn new(config: GestureConfig) -> Self {
        Self::with_history(config)
    }
}

impl<const N: usize> GestureClassifier<N> {
    const HISTORY_NOT_EMPTY: () = assert!(N > 0, "gesture history needs at least one slot");

    /// Classifier keeping the last `N` points of each touch.
    pub fn with_history(config: GestureConfig) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::HISTORY_NOT_EMPTY;
        Self {
            config,
            state: GestureState::new(),
            handler: None,
        }
    }

    pub fn set_handler(&mut self, handler: GestureCallback) {
        self.handler = Some(handler);
    }

    pub fn clear_handler(&mut self) {
        self.handler = None;
    }

    pub fn state(&self) -> &GestureState<N> {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.drag_active
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.state.last_activity_ms
    }

    /// Feed one sample; returns what was emitted, in emission order.
    ///
    /// The registered handler, if any, sees the same events before this
    /// returns. Without a handler the events are only returned.
    pub fn process(&mut self, sample: &TouchSample) -> Gestures {
        let mut out = Gestures::new();
        let now = sample.timestamp_ms;
        let point = sample.point();

        match sample.event {
            RawEvent::NoEvent => return out,
            RawEvent::PressDown => {
                self.press(point, now);
                self.emit(&mut out, Gesture::TouchStart, point);
            }
            RawEvent::Contact => {
                if !self.state.touch_active {
                    // the PressDown frame was missed
                    self.press(point, now);
                    self.emit(&mut out, Gesture::TouchStart, point);
                }
                self.contact(&mut out, point, now);
            }
            RawEvent::LiftUp => {
                if !self.state.touch_active {
                    return out;
                }
                self.lift(&mut out, point, now);
            }
        }

        self.state.last_event = sample.event;
        self.state.last_activity_ms = now;
        out
    }

    fn press(&mut self, point: TouchPoint, now: u64) {
        self.state.touch_active = true;
        self.state.drag_active = false;
        self.state.touch_start_ms = now;
        self.state.last_x = point.x;
        self.state.last_y = point.y;
        self.state.history.clear();
        self.state.history.write(point);
    }

    fn contact(&mut self, out: &mut Gestures, point: TouchPoint, now: u64) {
        let dx = point.x.abs_diff(self.state.last_x);
        let dy = point.y.abs_diff(self.state.last_y);
        let steady = dx <= self.config.drag_deviation_px || dy <= self.config.drag_deviation_px;
        let held_ms = now.saturating_sub(self.state.touch_start_ms);

        if !self.state.drag_active && steady && held_ms > self.config.drag_arm_ms {
            self.state.drag_active = true;
            self.emit(out, Gesture::DragStart, point);
        } else if self.state.drag_active {
            self.emit(out, Gesture::DragMove, point);
        }
        self.emit(out, Gesture::TouchMove, point);

        self.state.last_x = point.x;
        self.state.last_y = point.y;
        self.state.history.write(point);
    }

    fn lift(&mut self, out: &mut Gestures, point: TouchPoint, now: u64) {
        let held_ms = now.saturating_sub(self.state.touch_start_ms);
        self.emit(out, Gesture::TouchEnd, point);

        if self.state.drag_active {
            self.emit(out, Gesture::DragEnd, point);
            self.reset();
        } else if held_ms <= self.config.tap_window_ms {
            self.emit(out, Gesture::Tap, point);
            self.reset();
        } else {
            self.state.touch_active = false;
        }
    }

    fn reset(&mut self) {
        self.state.touch_active = false;
        self.state.drag_active = false;
        self.state.touch_start_ms = 0;
        self.state.last_x = 0;
        self.state.last_y = 0;
        self.state.history.clear();
    }

    fn emit(&self, out: &mut Gestures, gesture: Gesture, point: TouchPoint) {
        debug!("gesture {gesture:?} at ({}, {})", point.x, point.y);
        // capacity covers the longest emission path
        let _ = out.push(gesture);
        if let Some(handler) = self.handler {
            handler(gesture, point);
        }
    }
}
