// https://github.com/lvgl/lv_port_esp32/blob/master/components/lvgl_esp32_drivers/lvgl_touch/ft6x36.h
use embedded_hal::i2c::{Error, I2c};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::RegisterDevice;

pub const FT5436_ADDRESS: u8 = 0x38;

/// Touch detection threshold used when the board does not override it
pub const DEFAULT_THRESHOLD: u8 = 60;

/// The controller tracks at most two contacts; larger counts are garbage
pub const MAX_CONTACTS: u8 = 2;

const REG_DEVICE_MODE: u8 = 0x00;
const REG_NUM_TOUCHES: u8 = 0x02;
const REG_THRESHOLD: u8 = 0x80;
const REG_TOUCHRATE_ACTIVE: u8 = 0x88;
const REG_CHIPID: u8 = 0xA3;
const REG_FIRMWARE_VERSION: u8 = 0xA6;
const REG_PANEL_ID: u8 = 0xA8;

const VENDOR_ID: u8 = 0x11;
const ACTIVE_TOUCH_RATE: u8 = 0x0E;

/// Bytes per contact slot (XH, XL, YH, YL, WEIGHT, MISC)
const POINT_STRIDE: usize = 6;
/// TD_STATUS followed by both contact slots
const FRAME_LEN: usize = 1 + POINT_STRIDE * MAX_CONTACTS as usize;

#[derive(Debug, Clone, Copy, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipID {
    FT6206 = 0x06,
    FT6236 = 0x36,
    FT6336 = 0x64,
}

/// Per-sample touch phase reported in the event flag bits of XH
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawEvent {
    PressDown = 0,
    LiftUp = 1,
    Contact = 2,
    NoEvent = 3,
}

impl RawEvent {
    /// Decode the two event flag bits (7:6) of a P*_XH register.
    pub fn from_flags(xh: u8) -> Self {
        match xh >> 6 {
            0 => RawEvent::PressDown,
            1 => RawEvent::LiftUp,
            2 => RawEvent::Contact,
            _ => RawEvent::NoEvent,
        }
    }
}

/// Panel rotation, selected by the stored rotation index (0..=3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    Deg0 = 0,
    Deg90 = 1,
    Deg180 = 2,
    Deg270 = 3,
}

/// Map raw controller coordinates into panel coordinates.
///
/// `width` and `height` are the panel dimensions the controller is
/// mounted against. Coordinates outside the panel saturate at 0 instead
/// of wrapping.
pub fn transform(rotation: Rotation, x: u16, y: u16, width: u16, height: u16) -> (u16, u16) {
    match rotation {
        Rotation::Deg0 => (x, y),
        Rotation::Deg90 => (y, mirror(width, x)),
        Rotation::Deg180 => (mirror(width, x), mirror(height, y)),
        Rotation::Deg270 => (mirror(height, y), x),
    }
}

fn mirror(extent: u16, value: u16) -> u16 {
    extent.saturating_sub(value).saturating_sub(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

/// One decoded controller frame: contact count plus the first contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchData {
    pub points: u8,
    pub event: RawEvent,
    pub point: TouchPoint,
}

impl TouchData {
    /// The "no touch" frame reported when the controller has nothing valid.
    pub const fn released() -> Self {
        Self {
            points: 0,
            event: RawEvent::NoEvent,
            point: TouchPoint { x: 0, y: 0 },
        }
    }
}

/// Errors that can occur when interacting with the FT5436
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchSensorError {
    I2CError,
    /// Panel vendor register did not read back the FocalTech id
    UnknownVendor(u8),
    /// Chip id register did not match a supported FT6x36 part
    UnknownChip(u8),
}

impl<E> From<E> for TouchSensorError
where
    E: Error,
{
    fn from(_: E) -> Self {
        TouchSensorError::I2CError
    }
}

#[derive(Debug)]
pub struct FT5436<I2C> {
    dev: RegisterDevice<I2C>,
    rotation: Rotation,
    width: u16,
    height: u16,
}

impl<I2C> FT5436<I2C>
where
    I2C: I2c,
{
    /// Create a new FT5436 instance for a `width` x `height` panel
    pub fn new(i2c: I2C, width: u16, height: u16) -> Self {
        Self {
            dev: RegisterDevice::new(i2c, FT5436_ADDRESS),
            rotation: Rotation::Deg0,
            width,
            height,
        }
    }

    /// Identify the controller and program threshold and report rate.
    ///
    /// An unexpected vendor or chip id aborts bring-up before anything is
    /// written, so a foreign device on the address is left untouched.
    pub fn init(&mut self, threshold: u8) -> Result<ChipID, TouchSensorError> {
        let vendor = self.dev.read_register(REG_PANEL_ID)?;
        if vendor != VENDOR_ID {
            return Err(TouchSensorError::UnknownVendor(vendor));
        }

        let chip_id = self.get_chip_id()?;

        self.dev.write_register(REG_DEVICE_MODE, 0x00)?;
        self.dev.write_register(REG_THRESHOLD, threshold)?;
        self.dev
            .write_register(REG_TOUCHRATE_ACTIVE, ACTIVE_TOUCH_RATE)?;

        Ok(chip_id)
    }

    fn get_chip_id(&mut self) -> Result<ChipID, TouchSensorError> {
        let result = self.dev.read_register(REG_CHIPID)?;
        ChipID::try_from(result).map_err(|_| TouchSensorError::UnknownChip(result))
    }

    pub fn get_firmware_version(&mut self) -> Result<u8, TouchSensorError> {
        let result = self.dev.read_register(REG_FIRMWARE_VERSION)?;
        Ok(result)
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn set_touch_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Read the status and both contact slots in one burst.
    ///
    /// The first slot in a touch phase (press or contact) is reported,
    /// rotated into panel coordinates; with none, slot 1 is reported so a
    /// lift keeps its position. A contact count above [`MAX_CONTACTS`] is a
    /// transient controller glitch and yields [`TouchData::released`], as
    /// does a frame where no slot carries an event.
    pub fn read_touch(&mut self) -> Result<TouchData, TouchSensorError> {
        let mut buffer = [0u8; FRAME_LEN];
        self.dev.read_registers(REG_NUM_TOUCHES, &mut buffer)?;
        Ok(self.decode(&buffer))
    }

    fn decode(&self, buffer: &[u8; FRAME_LEN]) -> TouchData {
        let points = buffer[0] & 0x0F;
        if points > MAX_CONTACTS {
            return TouchData::released();
        }

        let slot = buffer[1..]
            .chunks_exact(POINT_STRIDE)
            .find(|slot| {
                matches!(
                    RawEvent::from_flags(slot[0]),
                    RawEvent::PressDown | RawEvent::Contact
                )
            })
            .unwrap_or(&buffer[1..1 + POINT_STRIDE]);

        let event = RawEvent::from_flags(slot[0]);
        if event == RawEvent::NoEvent {
            return TouchData::released();
        }

        let x = (u16::from(slot[0] & 0x0F) << 8) | u16::from(slot[1]);
        let y = (u16::from(slot[2] & 0x0F) << 8) | u16::from(slot[3]);
        let (x, y) = transform(self.rotation, x, y, self.width, self.height);

        TouchData {
            points,
            event,
            point: TouchPoint { x, y },
        }
    }

    /// Give the bus back, e.g. to hand it to a different driver.
    pub fn release(self) -> I2C {
        self.dev.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;

    fn identified_bus() -> MockBus {
        MockBus::new()
            .with(REG_PANEL_ID, VENDOR_ID)
            .with(REG_CHIPID, ChipID::FT6336.into())
    }

    /// Frame with slot 1 set and slot 2 idle.
    fn frame(bus: MockBus, count: u8, xh: u8, xl: u8, yh: u8, yl: u8) -> MockBus {
        bus.with(REG_NUM_TOUCHES, count)
            .with(0x03, xh)
            .with(0x04, xl)
            .with(0x05, yh)
            .with(0x06, yl)
            .with(0x09, 0xFF)
    }

    #[test]
    fn test_transform_identity() {
        assert_eq!(transform(Rotation::Deg0, 10, 20, 240, 240), (10, 20));
    }

    #[test]
    fn test_transform_180_mirrors_both_axes() {
        assert_eq!(transform(Rotation::Deg180, 10, 20, 240, 240), (229, 219));
    }

    #[test]
    fn test_transform_quarter_turns() {
        assert_eq!(transform(Rotation::Deg90, 10, 20, 240, 320), (20, 229));
        assert_eq!(transform(Rotation::Deg270, 10, 20, 240, 320), (299, 10));
    }

    #[test]
    fn test_transform_saturates_out_of_panel() {
        assert_eq!(transform(Rotation::Deg180, 300, 500, 240, 240), (0, 0));
    }

    #[test]
    fn test_init_programs_threshold_and_rate() {
        let mut touch = FT5436::new(identified_bus(), 240, 240);
        assert_eq!(touch.init(DEFAULT_THRESHOLD), Ok(ChipID::FT6336));

        let bus = touch.release();
        assert_eq!(
            bus.writes,
            vec![
                (REG_DEVICE_MODE, 0x00),
                (REG_THRESHOLD, DEFAULT_THRESHOLD),
                (REG_TOUCHRATE_ACTIVE, ACTIVE_TOUCH_RATE),
            ]
        );
    }

    #[test]
    fn test_init_rejects_unknown_vendor_without_writing() {
        let bus = MockBus::new().with(REG_PANEL_ID, 0x42);
        let mut touch = FT5436::new(bus, 240, 240);
        assert_eq!(
            touch.init(DEFAULT_THRESHOLD),
            Err(TouchSensorError::UnknownVendor(0x42))
        );
        assert!(touch.release().writes.is_empty());
    }

    #[test]
    fn test_init_rejects_unknown_chip() {
        let bus = MockBus::new()
            .with(REG_PANEL_ID, VENDOR_ID)
            .with(REG_CHIPID, 0x99);
        let mut touch = FT5436::new(bus, 240, 240);
        assert_eq!(
            touch.init(DEFAULT_THRESHOLD),
            Err(TouchSensorError::UnknownChip(0x99))
        );
    }

    #[test]
    fn test_read_touch_decodes_first_point() {
        // Contact flag, x = 0x012C, y = 0x0064
        let bus = frame(identified_bus(), 1, 0x81, 0x2C, 0x00, 0x64);
        let mut touch = FT5436::new(bus, 480, 480);
        let data = touch.read_touch().unwrap();
        assert_eq!(data.points, 1);
        assert_eq!(data.event, RawEvent::Contact);
        assert_eq!(data.point, TouchPoint { x: 300, y: 100 });
    }

    #[test]
    fn test_read_touch_applies_rotation() {
        let bus = frame(identified_bus(), 1, 0x00, 10, 0x00, 20);
        let mut touch = FT5436::new(bus, 240, 240);
        touch.set_rotation(Rotation::Deg180);
        let data = touch.read_touch().unwrap();
        assert_eq!(data.event, RawEvent::PressDown);
        assert_eq!(data.point, TouchPoint { x: 229, y: 219 });
    }

    #[test]
    fn test_read_touch_clamps_invalid_contact_count() {
        let bus = frame(identified_bus(), 0x0F, 0x80, 50, 0x00, 60);
        let mut touch = FT5436::new(bus, 240, 240);
        assert_eq!(touch.read_touch().unwrap(), TouchData::released());
    }

    #[test]
    fn test_lift_reported_with_zero_contacts() {
        let bus = frame(identified_bus(), 0, 0x40, 50, 0x00, 60);
        let mut touch = FT5436::new(bus, 240, 240);
        let data = touch.read_touch().unwrap();
        assert_eq!(data.points, 0);
        assert_eq!(data.event, RawEvent::LiftUp);
    }

    #[test]
    fn test_read_touch_reports_second_slot_when_first_is_idle() {
        let bus = frame(identified_bus(), 1, 0xC0, 0, 0x00, 0)
            .with(0x09, 0x80)
            .with(0x0A, 50)
            .with(0x0B, 0x00)
            .with(0x0C, 60);
        let mut touch = FT5436::new(bus, 240, 240);
        touch.set_rotation(Rotation::Deg180);
        let data = touch.read_touch().unwrap();
        assert_eq!(data.points, 1);
        assert_eq!(data.event, RawEvent::Contact);
        assert_eq!(data.point, TouchPoint { x: 189, y: 179 });
    }

    #[test]
    fn test_read_touch_prefers_first_active_slot() {
        let bus = frame(identified_bus(), 2, 0x80, 10, 0x00, 20)
            .with(0x09, 0x80)
            .with(0x0A, 50)
            .with(0x0C, 60);
        let mut touch = FT5436::new(bus, 240, 240);
        assert_eq!(touch.read_touch().unwrap().point, TouchPoint { x: 10, y: 20 });
    }

    #[test]
    fn test_read_touch_without_events_is_released() {
        let bus = frame(identified_bus(), 1, 0xC0, 10, 0x00, 20);
        let mut touch = FT5436::new(bus, 240, 240);
        assert_eq!(touch.read_touch().unwrap(), TouchData::released());
    }

    #[test]
    fn test_bus_error_propagates() {
        let mut bus = identified_bus();
        bus.nack = true;
        let mut touch = FT5436::new(bus, 240, 240);
        assert_eq!(touch.read_touch(), Err(TouchSensorError::I2CError));
    }
}
