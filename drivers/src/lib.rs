#![cfg_attr(not(test), no_std)]
//! Peripheral drivers for the watch board
//!
//! Blocking `embedded-hal` 1.0 drivers for the three I2C devices the
//! firmware talks to: the touch controller, the power-management IC and
//! the haptic driver.

use embedded_hal::i2c::I2c;

/// AXP2101 power-management IC driver.
pub mod axp2101;

/// DRV2605 haptic motor driver.
pub mod drv2605;

/// FT5436 (FT6x36 family) capacitive touch controller driver.
pub mod ft5436;

/// Register access shared by the drivers in this crate.
#[derive(Debug)]
pub(crate) struct RegisterDevice<I2C> {
    i2c: I2C,
    adr: u8,
}

impl<I2C> RegisterDevice<I2C>
where
    I2C: I2c,
{
    pub(crate) fn new(i2c: I2C, adr: u8) -> Self {
        Self { i2c, adr }
    }

    pub(crate) fn read_register(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut buffer = [0u8];
        self.i2c.write_read(self.adr, &[register], &mut buffer)?;
        Ok(buffer[0])
    }

    /// Burst read starting at `start`; the device auto-increments the address.
    pub(crate) fn read_registers(&mut self, start: u8, buffer: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.write_read(self.adr, &[start], buffer)
    }

    pub(crate) fn write_register(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.adr, &[register, value])
    }

    pub(crate) fn write_table(&mut self, table: &[(u8, u8)]) -> Result<(), I2C::Error> {
        for &(register, value) in table {
            self.write_register(register, value)?;
        }
        Ok(())
    }

    pub(crate) fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct MockError;

    impl embedded_hal::i2c::Error for MockError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    /// A single-device register file answering every address.
    pub struct MockBus {
        pub regs: [u8; 256],
        pub writes: Vec<(u8, u8)>,
        pub nack: bool,
        pointer: u8,
    }

    impl MockBus {
        pub fn new() -> Self {
            Self {
                regs: [0u8; 256],
                writes: Vec::new(),
                nack: false,
                pointer: 0,
            }
        }

        pub fn with(mut self, register: u8, value: u8) -> Self {
            self.regs[register as usize] = value;
            self
        }
    }

    impl ErrorType for MockBus {
        type Error = MockError;
    }

    impl embedded_hal::i2c::I2c for MockBus {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack {
                return Err(MockError);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((&register, data)) = bytes.split_first() {
                            self.pointer = register;
                            for &value in data {
                                self.regs[self.pointer as usize] = value;
                                self.writes.push((self.pointer, value));
                                self.pointer = self.pointer.wrapping_add(1);
                            }
                        }
                    }
                    Operation::Read(buffer) => {
                        for byte in buffer.iter_mut() {
                            *byte = self.regs[self.pointer as usize];
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::drv2605::{DeviceId, Effect};
    use crate::ft5436::{ChipID, RawEvent, Rotation};

    #[test]
    fn test_raw_event_from_flag_bits() {
        assert_eq!(RawEvent::from_flags(0x00), RawEvent::PressDown);
        assert_eq!(RawEvent::from_flags(0x40), RawEvent::LiftUp);
        assert_eq!(RawEvent::from_flags(0x80), RawEvent::Contact);
        assert_eq!(RawEvent::from_flags(0xC0), RawEvent::NoEvent);
        // low bits carry the x coordinate MSBs and must not leak in
        assert_eq!(RawEvent::from_flags(0x8F), RawEvent::Contact);
    }

    #[test]
    fn test_rotation_from_index() {
        assert_eq!(Rotation::try_from(0u8), Ok(Rotation::Deg0));
        assert_eq!(Rotation::try_from(1u8), Ok(Rotation::Deg90));
        assert_eq!(Rotation::try_from(2u8), Ok(Rotation::Deg180));
        assert_eq!(Rotation::try_from(3u8), Ok(Rotation::Deg270));
        assert!(Rotation::try_from(4u8).is_err());
    }

    #[test]
    fn test_chip_id_from() {
        assert_eq!(ChipID::try_from(0x06u8), Ok(ChipID::FT6206));
        assert_eq!(ChipID::try_from(0x36u8), Ok(ChipID::FT6236));
        assert_eq!(ChipID::try_from(0x64u8), Ok(ChipID::FT6336));
        assert!(ChipID::try_from(0x11u8).is_err());
    }

    #[test]
    fn test_haptic_device_id_from_status() {
        assert_eq!(DeviceId::from_status(0x60), Some(DeviceId::DRV2605));
        assert_eq!(DeviceId::from_status(0xE0), Some(DeviceId::DRV2605L));
        assert_eq!(DeviceId::from_status(0x00), None);
    }

    #[test]
    fn test_effect_ids() {
        assert_eq!(u8::from(Effect::StrongClick), 1);
        assert_eq!(u8::from(Effect::SharpTick), 24);
        assert_eq!(u8::from(Effect::PulsingStrong), 52);
    }
}
