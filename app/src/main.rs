#![no_std]
#![no_main]

use alloc::boxed::Box;
use controller::Controller;
use embassy_executor::Spawner;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::Io;
use esp_hal_embassy::main;
use esp_println::logger::init_logger_from_env;
use log::info;
use render_task::render_task;
use slint::platform::software_renderer::{MinimalSoftwareWindow, RepaintBufferType};
use slint::{ComponentHandle, PhysicalSize};
use slint_backend::Backend;
use slint_generated::AppWindow;
use tick::tick_task;
use watch_core::WakeChannel;

extern crate alloc;

mod controller;
mod display_line_buffer;
mod hardware;
mod render_task;
mod slint_backend;
mod tick;

esp_bootloader_esp_idf::esp_app_desc!();

/// Touch interrupt to render task wake
pub static WAKE: WakeChannel = WakeChannel::new();

#[main]
async fn main(spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::_240MHz));

    esp_alloc::heap_allocator!(size: 72 * 1024);
    esp_alloc::psram_allocator!(peripherals.PSRAM, esp_hal::psram);

    init_logger_from_env();

    let timg0 = esp_hal::timer::timg::TimerGroup::new(peripherals.TIMG0);
    esp_hal_embassy::init(timg0.timer0);
    info!("Embassy initialized!");

    let mut io = Io::new(peripherals.IO_MUX);
    io.set_interrupt_handler(hardware::touch_interrupt);

    let (display, backlight) = hardware::initialize_display(
        peripherals.GPIO38,
        peripherals.GPIO18,
        peripherals.GPIO13,
        peripherals.GPIO12,
        peripherals.GPIO45,
        peripherals.SPI2,
        peripherals.DMA_CH0,
    );

    let touchpad = hardware::initialize_touchpad(
        peripherals.I2C0,
        peripherals.GPIO39,
        peripherals.GPIO40,
        peripherals.GPIO16,
    );

    let shared_i2c =
        hardware::initialize_shared_i2c(peripherals.I2C1, peripherals.GPIO10, peripherals.GPIO11);
    let pmu = hardware::initialize_pmu(shared_i2c);
    let haptics = hardware::initialize_haptics(shared_i2c);

    let window = MinimalSoftwareWindow::new(RepaintBufferType::ReusedBuffer);
    window.set_size(PhysicalSize::new(
        hardware::DISPLAY_WIDTH.into(),
        hardware::DISPLAY_HEIGHT.into(),
    ));

    // Set the platform for Slint
    let backend = Box::new(Backend::new(window.clone()));
    slint::platform::set_platform(backend).expect("set_platform failed");

    // TASK: toolkit tick source, started by the render task
    spawner.spawn(tick_task()).ok();

    // TASK: run the gui render loop
    spawner
        .spawn(render_task(window, display, touchpad, backlight))
        .ok();

    // Initialize UI
    let app_window = AppWindow::new().expect("UI init failed");
    app_window.show().expect("UI show failed");

    // run the controller event loop
    let mut controller = Controller::new(&app_window, pmu, haptics);
    controller.run().await;
}
