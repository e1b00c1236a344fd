use embedded_hal::i2c::{Error, I2c};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::RegisterDevice;

pub const DRV2605_ADDRESS: u8 = 0x5A;

const REG_STATUS: u8 = 0x00;
const REG_MODE: u8 = 0x01;
const REG_LIBRARY: u8 = 0x03;
const REG_WAVESEQ1: u8 = 0x04;
const REG_GO: u8 = 0x0C;
const REG_AUDIOMAX: u8 = 0x13;

const MODE_INTERNAL_TRIGGER: u8 = 0x00;
const LIBRARY_ERM_A: u8 = 0x01;

/// Number of waveform sequencer slots
pub const SEQUENCE_SLOTS: usize = 8;
/// Highest effect id in the ROM libraries
pub const MAX_EFFECT: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceId {
    DRV2605,
    DRV2604,
    DRV2604L,
    DRV2605L,
}

impl DeviceId {
    /// Decode the device id from STATUS bits 7:5.
    pub fn from_status(status: u8) -> Option<Self> {
        match status >> 5 {
            3 => Some(DeviceId::DRV2605),
            4 => Some(DeviceId::DRV2604),
            6 => Some(DeviceId::DRV2604L),
            7 => Some(DeviceId::DRV2605L),
            _ => None,
        }
    }
}

/// ROM library effects used by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Strong Click 100%
    StrongClick = 1,
    /// Soft Fuzz 60%
    SoftFuzz = 13,
    /// Sharp Tick 1 100%
    SharpTick = 24,
    /// Buzz 1 100%
    Buzz = 47,
    /// Pulsing Strong 1 100%
    PulsingStrong = 52,
}

/// Errors that can occur when interacting with the DRV2605
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HapticError {
    I2CError,
    /// STATUS did not carry a known device id
    UnknownDevice(u8),
    /// Effect id outside 1..=123
    InvalidEffect(u8),
}

impl<E> From<E> for HapticError
where
    E: Error,
{
    fn from(_: E) -> Self {
        HapticError::I2CError
    }
}

#[derive(Debug)]
pub struct DRV2605<I2C> {
    dev: RegisterDevice<I2C>,
}

impl<I2C> DRV2605<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            dev: RegisterDevice::new(i2c, DRV2605_ADDRESS),
        }
    }

    /// Leave standby in internal-trigger mode with the ERM library and the
    /// default sequence loaded.
    pub fn init(&mut self) -> Result<DeviceId, HapticError> {
        let status = self.dev.read_register(REG_STATUS)?;
        let device = DeviceId::from_status(status).ok_or(HapticError::UnknownDevice(status))?;

        self.dev.write_register(REG_MODE, MODE_INTERNAL_TRIGGER)?;
        self.dev.write_register(REG_LIBRARY, LIBRARY_ERM_A)?;
        self.dev.write_register(REG_AUDIOMAX, 100)?;
        self.load_sequence(&[
            Effect::StrongClick.into(),
            Effect::SoftFuzz.into(),
            Effect::SharpTick.into(),
            Effect::Buzz.into(),
            Effect::PulsingStrong.into(),
        ])?;

        Ok(device)
    }

    pub fn play(&mut self, effect: Effect) -> Result<(), HapticError> {
        self.play_sequence(&[effect.into()])
    }

    /// Load up to eight effect ids and fire them back to back.
    pub fn play_sequence(&mut self, effects: &[u8]) -> Result<(), HapticError> {
        self.load_sequence(effects)?;
        self.dev.write_register(REG_GO, 0x01)?;
        Ok(())
    }

    fn load_sequence(&mut self, effects: &[u8]) -> Result<(), HapticError> {
        let effects = &effects[..effects.len().min(SEQUENCE_SLOTS)];
        if let Some(&bad) = effects.iter().find(|&&e| e == 0 || e > MAX_EFFECT) {
            return Err(HapticError::InvalidEffect(bad));
        }

        for (slot, &effect) in effects.iter().enumerate() {
            self.dev.write_register(REG_WAVESEQ1 + slot as u8, effect)?;
        }
        // a zero slot terminates the sequence
        if effects.len() < SEQUENCE_SLOTS {
            self.dev
                .write_register(REG_WAVESEQ1 + effects.len() as u8, 0)?;
        }
        Ok(())
    }

    pub fn release(self) -> I2C {
        self.dev.release()
    }
}
