//! Display hardware initialization module
//!
//! The ST7789 has 240x320 of frame memory behind a 240x240 glass. The
//! panel is mounted mirrored on both axes, so with a 180 degree
//! orientation the visible window starts 80 rows into the memory.

use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::dma::DmaTxBuf;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{DMA_CH0, GPIO12, GPIO13, GPIO18, GPIO38, GPIO45, SPI2};
use esp_hal::spi::master::{Config as SpiConfig, Spi, SpiDmaBus};
use esp_hal::spi::Mode;
use esp_hal::time::Rate;
use esp_hal::{dma_buffers, Blocking};
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7789;
use mipidsi::options::{Orientation, Rotation};
use mipidsi::{Builder, Display, NoResetPin};
use static_cell::StaticCell;

pub const DISPLAY_HEIGHT: u16 = 240;
pub const DISPLAY_WIDTH: u16 = 240;

/// Rows between the start of frame memory and the visible window
const PANEL_ROW_OFFSET: u16 = 80;

pub type TouchDisplay = Display<
    SpiInterface<
        'static,
        ExclusiveDevice<SpiDmaBus<'static, Blocking>, Output<'static>, NoDelay>,
        Output<'static>,
    >,
    ST7789,
    NoResetPin,
>;

/// Initializes the ST7789 and returns it with the backlight pin, backlight
/// off.
///
/// # Panics
///
/// Panics if the SPI bus or the panel init sequence fails; there is no UI
/// without a display.
#[allow(clippy::too_many_arguments)]
pub fn initialize_display(
    dc: GPIO38<'static>,
    sck: GPIO18<'static>,
    mosi: GPIO13<'static>,
    cs: GPIO12<'static>,
    backlight: GPIO45<'static>,
    spi: SPI2<'static>,
    dma: DMA_CH0<'static>,
) -> (TouchDisplay, Output<'static>) {
    let dc = Output::new(dc, Level::Low, OutputConfig::default());
    let cs = Output::new(cs, Level::High, OutputConfig::default());
    let sck = Output::new(sck, Level::Low, OutputConfig::default());
    let mosi = Output::new(mosi, Level::Low, OutputConfig::default());
    let backlight = Output::new(backlight, Level::Low, OutputConfig::default());

    let spi_dma = Spi::new(
        spi,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(40))
            .with_mode(Mode::_0),
    )
    .expect("SPI config rejected")
    .with_sck(sck)
    .with_mosi(mosi)
    .with_dma(dma);

    #[allow(clippy::manual_div_ceil)]
    let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(4096);
    let dma_rx_buf = esp_hal::dma::DmaRxBuf::new(rx_descriptors, rx_buffer).expect("DMA rx buffer");
    let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer).expect("DMA tx buffer");

    let spi = SpiDmaBus::new(spi_dma, dma_rx_buf, dma_tx_buf);
    let spi_device = ExclusiveDevice::new_no_delay(spi, cs).expect("SPI device");

    static DISPLAY_BUFFER: StaticCell<[u8; 512]> = StaticCell::new();
    let buffer = DISPLAY_BUFFER.init([0_u8; 512]);

    let di = SpiInterface::new(spi_device, dc, buffer);

    let display = Builder::new(ST7789, di)
        .display_size(DISPLAY_WIDTH, DISPLAY_HEIGHT)
        .display_offset(0, PANEL_ROW_OFFSET)
        .orientation(Orientation {
            mirrored: false,
            rotation: Rotation::Deg180,
        })
        .init(&mut esp_hal::delay::Delay::new())
        .expect("Failed to initialize display");

    (display, backlight)
}
