use alloc::format;
use drivers::drv2605::Effect;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use log::{info, warn};
use slint_generated::AppWindow;

use crate::hardware::{Haptics, Pmu};

pub struct Controller<'a> {
    app_window: &'a AppWindow,
    pmu: Option<Pmu>,
    haptics: Option<Haptics>,
}

#[derive(Debug, Clone)]
pub enum Action {
    /// Re-read the fuel gauge into the battery label
    RefreshBattery,
    /// Play a haptic effect
    Haptic(Effect),
    /// One of the grid buttons was clicked
    ButtonClicked(i32),
}

type ActionChannelType = Channel<CriticalSectionRawMutex, Action, 4>;

pub static ACTION: ActionChannelType = Channel::new();

impl<'a> Controller<'a> {
    pub fn new(app_window: &'a AppWindow, pmu: Option<Pmu>, haptics: Option<Haptics>) -> Self {
        Self {
            app_window,
            pmu,
            haptics,
        }
    }

    pub async fn run(&mut self) {
        self.set_action_event_handlers();
        self.refresh_battery();

        loop {
            let action = ACTION.receive().await;
            self.process_action(action);
        }
    }

    pub fn process_action(&mut self, action: Action) {
        match action {
            Action::RefreshBattery => self.refresh_battery(),
            Action::Haptic(effect) => {
                if let Some(haptics) = self.haptics.as_mut() {
                    if let Err(e) = haptics.play(effect) {
                        warn!("haptic {effect:?}: {e:?}");
                    }
                }
            }
            Action::ButtonClicked(index) => info!("button {index} clicked"),
        }
    }

    fn refresh_battery(&mut self) {
        let Some(pmu) = self.pmu.as_mut() else {
            return;
        };
        match pmu.battery_percent() {
            Ok(percent) => self.app_window.set_battery(format!("{percent}%").into()),
            Err(e) => warn!("battery read: {e:?}"),
        }
    }

    // user initiated action event handlers
    fn set_action_event_handlers(&self) {
        self.app_window
            .on_button_clicked(|index| send_action(Action::ButtonClicked(index)));
    }
}

pub fn send_action(a: Action) {
    // non-blocking, callers are sync code (gesture handler, slint callbacks)
    if let Err(e) = ACTION.try_send(a) {
        warn!("action queue full, dropped {e:?}");
    }
}
