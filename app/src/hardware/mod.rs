//! Hardware initialization modules
//!
//! Bring-up for the T-Watch S3 peripherals the firmware uses:
//!
//! - **Display**: ST7789 240x240 TFT via SPI with DMA, GPIO backlight
//! - **Touchpad**: FT5436 capacitive touch controller on I2C0 with its
//!   interrupt line as the wake source
//! - **PMU / Haptics**: AXP2101 and DRV2605 sharing I2C1

pub mod display;
pub mod peripherals;
pub mod touch;

pub use display::{initialize_display, TouchDisplay, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use peripherals::{initialize_haptics, initialize_pmu, initialize_shared_i2c, Haptics, Pmu};
pub use touch::{initialize_touchpad, touch_interrupt, TouchWakeLine, Touchpad};
