//! <https://github.com/lewisxhe/XPowersLib/blob/master/src/REG/AXP2101Constants.h>
//!
//! Only the subset the watch needs: bring-up of the rails feeding the
//! display, touch, radio and vibration motor, charger limits, and the
//! fuel-gauge percentage.
use bitflags::bitflags;
use embedded_hal::i2c::{Error, I2c};

use crate::RegisterDevice;

pub const AXP2101_ADDRESS: u8 = 0x34;

const CHIP_ID: u8 = 0x4A;

const REG_STATUS2: u8 = 0x01;
const REG_IC_TYPE: u8 = 0x03;
const REG_INPUT_CUR_LIMIT_CTRL: u8 = 0x16;
const REG_CHARGE_GAUGE_WDT_CTRL: u8 = 0x18;
const REG_VOFF_SET: u8 = 0x24;
const REG_IRQ_OFF_ON_LEVEL_CTRL: u8 = 0x27;
const REG_ADC_CHANNEL_CTRL: u8 = 0x30;
const REG_IPRECHG_SET: u8 = 0x61;
const REG_ICC_CHG_SET: u8 = 0x62;
const REG_ITERM_CHG_SET_CTRL: u8 = 0x63;
const REG_CV_CHG_VOL_SET: u8 = 0x64;
const REG_BTN_BAT_CHG_VOL_SET: u8 = 0x6A;
const REG_DC_ONOFF_DVM_CTRL: u8 = 0x80;
const REG_LDO_ONOFF_CTRL0: u8 = 0x90;
const REG_LDO_ONOFF_CTRL1: u8 = 0x91;
const REG_ALDO1_VOL: u8 = 0x92;
const REG_ALDO2_VOL: u8 = 0x93;
const REG_ALDO3_VOL: u8 = 0x94;
const REG_ALDO4_VOL: u8 = 0x95;
const REG_BLDO2_VOL: u8 = 0x97;
const REG_BAT_PERCENT_DATA: u8 = 0xA4;

/// 0.5V + 0.1V steps: 0x1C = 3.3V
const LDO_3V3: u8 = 0x1C;

bitflags! {
    /// LDO_ONOFF_CTRL0 enable bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LdoEnable: u8 {
        /// RTC
        const ALDO1 = 1 << 0;
        /// TFT backlight
        const ALDO2 = 1 << 1;
        /// Touch controller
        const ALDO3 = 1 << 2;
        /// Radio
        const ALDO4 = 1 << 3;
        const BLDO1 = 1 << 4;
        /// Vibration motor
        const BLDO2 = 1 << 5;
        const CPUSLDO = 1 << 6;
        const DLDO1 = 1 << 7;
    }
}

impl Default for LdoEnable {
    fn default() -> Self {
        LdoEnable::ALDO1 | LdoEnable::ALDO2 | LdoEnable::ALDO3 | LdoEnable::ALDO4 | LdoEnable::BLDO2
    }
}

/// Charger state from STATUS2 bits 6:5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargeDirection {
    Standby,
    Charging,
    Discharging,
}

/// Errors that can occur when interacting with the AXP2101
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PmuError {
    I2CError,
    /// IC type register did not read back the AXP2101 id
    UnknownChip(u8),
}

impl<E> From<E> for PmuError
where
    E: Error,
{
    fn from(_: E) -> Self {
        PmuError::I2CError
    }
}

#[derive(Debug)]
pub struct AXP2101<I2C> {
    dev: RegisterDevice<I2C>,
}

impl<I2C> AXP2101<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            dev: RegisterDevice::new(i2c, AXP2101_ADDRESS),
        }
    }

    /// Verify the chip and apply the board's power table.
    pub fn init(&mut self) -> Result<(), PmuError> {
        let chip_id = self.dev.read_register(REG_IC_TYPE)?;
        if chip_id != CHIP_ID {
            return Err(PmuError::UnknownChip(chip_id));
        }

        self.dev.write_table(&[
            // 100mA VBUS input current limit
            (REG_INPUT_CUR_LIMIT_CTRL, 0x00),
            // 2.6V power-off threshold
            (REG_VOFF_SET, 0x00),
            (REG_ALDO1_VOL, LDO_3V3),
            (REG_ALDO2_VOL, LDO_3V3),
            (REG_ALDO3_VOL, LDO_3V3),
            (REG_ALDO4_VOL, LDO_3V3),
            (REG_BLDO2_VOL, LDO_3V3),
            // DC1 only
            (REG_DC_ONOFF_DVM_CTRL, 0x01),
            // DLDO2 off
            (REG_LDO_ONOFF_CTRL1, 0x00),
            (REG_LDO_ONOFF_CTRL0, LdoEnable::default().bits()),
            // fastest power key on/off times
            (REG_IRQ_OFF_ON_LEVEL_CTRL, 0x10),
            // battery, VBUS and system voltage channels
            (REG_ADC_CHANNEL_CTRL, 0x0D),
            // 50mA precharge
            (REG_IPRECHG_SET, 0x02),
            // 100mA constant current
            (REG_ICC_CHG_SET, 0x04),
            // 25mA termination
            (REG_ITERM_CHG_SET_CTRL, 0x01),
            // 4.35V charge voltage
            (REG_CV_CHG_VOL_SET, 0x04),
            // 3.3V button battery termination
            (REG_BTN_BAT_CHG_VOL_SET, 0x07),
            // button battery charge + fuel gauge enable
            (REG_CHARGE_GAUGE_WDT_CTRL, 0x0E),
        ])?;

        Ok(())
    }

    /// Fuel gauge state of charge, 0..=100
    pub fn battery_percent(&mut self) -> Result<u8, PmuError> {
        let result = self.dev.read_register(REG_BAT_PERCENT_DATA)?;
        Ok(result.min(100))
    }

    pub fn charge_direction(&mut self) -> Result<ChargeDirection, PmuError> {
        let result = self.dev.read_register(REG_STATUS2)?;
        Ok(match (result >> 5) & 0x03 {
            0b01 => ChargeDirection::Charging,
            0b10 => ChargeDirection::Discharging,
            _ => ChargeDirection::Standby,
        })
    }

    pub fn release(self) -> I2C {
        self.dev.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;

    #[test]
    fn test_default_ldo_mask_matches_board_rails() {
        assert_eq!(LdoEnable::default().bits(), 0x2F);
    }

    #[test]
    fn test_init_writes_power_table() {
        let mut pmu = AXP2101::new(MockBus::new().with(REG_IC_TYPE, CHIP_ID));
        pmu.init().unwrap();
        let bus = pmu.release();
        assert_eq!(bus.writes.len(), 18);
        assert!(bus.writes.contains(&(REG_LDO_ONOFF_CTRL0, 0x2F)));
        assert_eq!(bus.writes.last(), Some(&(REG_CHARGE_GAUGE_WDT_CTRL, 0x0E)));
    }

    #[test]
    fn test_init_rejects_foreign_chip() {
        let mut pmu = AXP2101::new(MockBus::new().with(REG_IC_TYPE, 0x47));
        assert_eq!(pmu.init(), Err(PmuError::UnknownChip(0x47)));
        assert!(pmu.release().writes.is_empty());
    }

    #[test]
    fn test_battery_percent_is_capped() {
        let mut pmu = AXP2101::new(MockBus::new().with(REG_BAT_PERCENT_DATA, 0xFF));
        assert_eq!(pmu.battery_percent(), Ok(100));
    }

    #[test]
    fn test_charge_direction() {
        let mut pmu = AXP2101::new(MockBus::new().with(REG_STATUS2, 0b0010_0000));
        assert_eq!(pmu.charge_direction(), Ok(ChargeDirection::Charging));
        let mut pmu = AXP2101::new(MockBus::new().with(REG_STATUS2, 0b0100_0000));
        assert_eq!(pmu.charge_direction(), Ok(ChargeDirection::Discharging));
    }
}
