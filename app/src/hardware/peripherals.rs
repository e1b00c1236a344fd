//! PMU and haptics initialization module
//!
//! The AXP2101 and DRV2605 share I2C1 through an [`AtomicCell`]. Both are
//! optional: a chip that fails identification is logged and the firmware
//! runs without it.

use drivers::axp2101::AXP2101;
use drivers::drv2605::DRV2605;
use embedded_hal_bus::i2c::AtomicDevice;
use embedded_hal_bus::util::AtomicCell;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::peripherals::{GPIO10, GPIO11, I2C1};
use esp_hal::time::Rate;
use esp_hal::xtensa_lx::singleton;
use esp_hal::Blocking;
use log::{info, warn};

pub type SharedI2c = AtomicDevice<'static, I2c<'static, Blocking>>;
pub type Pmu = AXP2101<SharedI2c>;
pub type Haptics = DRV2605<SharedI2c>;

/// Sets up I2C1 for sharing between the PMU and the haptic driver.
///
/// # Panics
///
/// Panics if the bus configuration is rejected or the cell was already
/// taken.
pub fn initialize_shared_i2c(
    i2c: I2C1<'static>,
    sda: GPIO10<'static>,
    scl: GPIO11<'static>,
) -> &'static AtomicCell<I2c<'static, Blocking>> {
    let i2c = I2c::new(i2c, I2cConfig::default().with_frequency(Rate::from_khz(400)))
        .expect("I2C1 config rejected")
        .with_sda(sda)
        .with_scl(scl);

    singleton!(:AtomicCell<I2c<'static, Blocking>> = AtomicCell::new(i2c))
        .expect("Failed to create I2C cell")
}

pub fn initialize_pmu(bus: &'static AtomicCell<I2c<'static, Blocking>>) -> Option<Pmu> {
    let mut pmu = AXP2101::new(AtomicDevice::new(bus));
    if let Err(e) = pmu.init() {
        warn!("PMU bring-up failed, continuing without battery info: {e:?}");
        return None;
    }

    match (pmu.battery_percent(), pmu.charge_direction()) {
        (Ok(percent), Ok(direction)) => info!("Battery {percent}%, {direction:?}"),
        (Err(e), _) | (_, Err(e)) => warn!("PMU status read failed: {e:?}"),
    }
    Some(pmu)
}

pub fn initialize_haptics(bus: &'static AtomicCell<I2c<'static, Blocking>>) -> Option<Haptics> {
    let mut haptics = DRV2605::new(AtomicDevice::new(bus));
    match haptics.init() {
        Ok(device) => {
            info!("Haptics {device:?}");
            Some(haptics)
        }
        Err(e) => {
            warn!("Haptics bring-up failed, continuing without feedback: {e:?}");
            None
        }
    }
}
