//! Touch Sampler
//!
//! Wraps a touch controller behind [`TouchSource`] and turns every poll
//! into a timestamped [`TouchSample`]. Transport failures never leave this
//! module: they are logged and reported as a "no contact" sample so the
//! gesture and refresh layers only ever see touch data.
use core::fmt::Debug;

use drivers::ft5436::{RawEvent, TouchData, TouchPoint, TouchSensorError, FT5436, MAX_CONTACTS};
use embedded_hal::i2c::I2c;
use log::warn;

use crate::config::TouchConfig;

/// A controller the sampler can poll.
pub trait TouchSource {
    type Error: Debug;

    /// One bus transaction returning the first contact and the raw event.
    fn read(&mut self) -> Result<TouchData, Self::Error>;
}

impl<I2C> TouchSource for FT5436<I2C>
where
    I2C: I2c,
{
    type Error = TouchSensorError;

    fn read(&mut self) -> Result<TouchData, Self::Error> {
        self.read_touch()
    }
}

/// One poll of the controller, stamped with the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchSample {
    pub x: u16,
    pub y: u16,
    pub event: RawEvent,
    pub contacts: u8,
    pub timestamp_ms: u64,
}

impl TouchSample {
    pub fn new(event: RawEvent, x: u16, y: u16, timestamp_ms: u64) -> Self {
        let contacts = match event {
            RawEvent::PressDown | RawEvent::Contact => 1,
            RawEvent::LiftUp | RawEvent::NoEvent => 0,
        };
        Self {
            x,
            y,
            event,
            contacts,
            timestamp_ms,
        }
    }

    pub fn point(&self) -> TouchPoint {
        TouchPoint {
            x: self.x,
            y: self.y,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.contacts > 0
    }

    fn from_data(data: TouchData, timestamp_ms: u64) -> Self {
        // sources other than the FT5436 may not clamp on their own
        if data.points > MAX_CONTACTS {
            return Self::from_data(TouchData::released(), timestamp_ms);
        }
        // press flags left in the registers after the finger is gone
        if data.points == 0 && matches!(data.event, RawEvent::PressDown | RawEvent::Contact) {
            return Self::from_data(TouchData::released(), timestamp_ms);
        }
        // a count without any event has no usable point
        if data.points > 0 && data.event == RawEvent::NoEvent {
            return Self::from_data(TouchData::released(), timestamp_ms);
        }
        Self {
            x: data.point.x,
            y: data.point.y,
            event: data.event,
            contacts: data.points,
            timestamp_ms,
        }
    }
}

/// Pressed/released view for a pull-model input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointerState {
    Pressed,
    Released,
}

pub struct TouchSampler<T> {
    source: T,
    last: TouchSample,
    transport_errors: u32,
}

impl<T> TouchSampler<T>
where
    T: TouchSource,
{
    pub fn new(source: T) -> Self {
        Self {
            source,
            last: TouchSample::from_data(TouchData::released(), 0),
            transport_errors: 0,
        }
    }

    /// Poll the controller once.
    pub fn sample(&mut self, now_ms: u64) -> TouchSample {
        let sample = match self.source.read() {
            Ok(data) => TouchSample::from_data(data, now_ms),
            Err(e) => {
                self.transport_errors = self.transport_errors.saturating_add(1);
                warn!("touch read failed, treating as no contact: {e:?}");
                TouchSample::from_data(TouchData::released(), now_ms)
            }
        };
        self.last = sample;
        sample
    }

    /// Point of the last sample.
    pub fn current_point(&self) -> TouchPoint {
        self.last.point()
    }

    pub fn current_event(&self) -> RawEvent {
        self.last.event
    }

    pub fn current_state(&self) -> PointerState {
        if self.last.is_pressed() {
            PointerState::Pressed
        } else {
            PointerState::Released
        }
    }

    /// Reads that failed on the bus since start-up
    pub fn transport_errors(&self) -> u32 {
        self.transport_errors
    }
}

impl<I2C> TouchSampler<FT5436<I2C>>
where
    I2C: I2c,
{
    /// Sampler over an FT5436 with the panel geometry and rotation applied.
    pub fn with_config(mut touch: FT5436<I2C>, config: &TouchConfig) -> Self {
        touch.set_rotation(config.rotation);
        touch.set_touch_size(config.width, config.height);
        Self::new(touch)
    }
}
