//! Touchpad hardware initialization module
//!
//! The FT5436 sits alone on I2C0 and is only ever polled by the render
//! task. Its interrupt line is the wake source while the display is
//! suspended: the pin lives in a critical-section cell shared between the
//! GPIO interrupt handler and the power controller.

use core::cell::RefCell;

use critical_section::Mutex;
use drivers::ft5436::{DEFAULT_THRESHOLD, FT5436};
use esp_hal::gpio::{Event, Input, InputConfig, Pull};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::peripherals::{GPIO16, GPIO39, GPIO40, I2C0};
use esp_hal::time::Rate;
use esp_hal::{handler, ram, Blocking};
use log::{info, warn};
use watch_core::WakeLine;

use super::display::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::WAKE;

pub type Touchpad = FT5436<I2c<'static, Blocking>>;

/// Touch interrupt pin, owned by the GPIO interrupt handler
pub static TOUCH_INT: Mutex<RefCell<Option<Input<'static>>>> = Mutex::new(RefCell::new(None));

/// Initializes the FT5436 and parks its interrupt pin in [`TOUCH_INT`].
///
/// A controller that fails identification is logged and still returned:
/// every read then degrades to "no contact" and the display can never be
/// woken by touch.
pub fn initialize_touchpad(
    i2c: I2C0<'static>,
    sda: GPIO39<'static>,
    scl: GPIO40<'static>,
    int: GPIO16<'static>,
) -> Touchpad {
    let i2c = I2c::new(i2c, I2cConfig::default().with_frequency(Rate::from_khz(400)))
        .expect("I2C0 config rejected")
        .with_sda(sda)
        .with_scl(scl);

    let mut touchpad = FT5436::new(i2c, DISPLAY_WIDTH, DISPLAY_HEIGHT);
    match touchpad.init(DEFAULT_THRESHOLD) {
        Ok(chip) => {
            let firmware = touchpad.get_firmware_version().unwrap_or_default();
            info!("Touchpad {chip:?}, firmware 0x{firmware:02X}");
        }
        Err(e) => warn!("Touchpad bring-up failed: {e:?}"),
    }

    let int = Input::new(int, InputConfig::default().with_pull(Pull::Up));
    critical_section::with(|cs| TOUCH_INT.borrow_ref_mut(cs).replace(int));

    touchpad
}

/// Borrowed interrupt pin, as handed to the wake channel.
pub struct IrqPin<'a>(pub &'a mut Input<'static>);

impl WakeLine for IrqPin<'_> {
    fn set_interrupt_enabled(&mut self, enabled: bool) {
        if enabled {
            self.0.clear_interrupt();
            self.0.listen(Event::FallingEdge);
        } else {
            self.0.unlisten();
        }
    }
}

/// Wake line handle for the power controller.
pub struct TouchWakeLine;

impl WakeLine for TouchWakeLine {
    fn set_interrupt_enabled(&mut self, enabled: bool) {
        critical_section::with(|cs| {
            if let Some(pin) = TOUCH_INT.borrow_ref_mut(cs).as_mut() {
                IrqPin(pin).set_interrupt_enabled(enabled);
            }
        });
    }
}

#[handler]
#[ram]
pub fn touch_interrupt() {
    critical_section::with(|cs| {
        if let Some(pin) = TOUCH_INT.borrow_ref_mut(cs).as_mut() {
            if pin.is_interrupt_set() {
                pin.clear_interrupt();
                WAKE.post_from_isr(&mut IrqPin(pin));
            }
        }
    });
}
