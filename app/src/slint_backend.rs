use alloc::rc::Rc;
use core::time::Duration;
use log::info;
use slint::{
    platform::{software_renderer::MinimalSoftwareWindow, Platform, WindowAdapter},
    PlatformError,
};

use crate::tick::toolkit_millis;

pub struct Backend {
    window: Rc<MinimalSoftwareWindow>,
}

impl Backend {
    pub fn new(window: Rc<MinimalSoftwareWindow>) -> Self {
        Self { window }
    }
}

impl Platform for Backend {
    fn create_window_adapter(&self) -> Result<Rc<dyn WindowAdapter>, PlatformError> {
        let window = self.window.clone();
        info!("Creating window adapter");
        Ok(window)
    }

    // driven by the tick source, so it stands still while suspended
    fn duration_since_start(&self) -> Duration {
        Duration::from_millis(toolkit_millis())
    }
}
