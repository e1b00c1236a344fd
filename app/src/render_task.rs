use alloc::rc::Rc;
use drivers::drv2605::Effect;
use drivers::ft5436::{RawEvent, TouchPoint};
use embassy_time::{Delay, Instant};
use esp_hal::gpio::Output;
use log::warn;
use slint::{
    platform::{
        software_renderer::{MinimalSoftwareWindow, Rgb565Pixel},
        PointerEventButton, WindowEvent,
    },
    LogicalPosition,
};
use watch_core::{
    Clock, Gesture, GestureClassifier, GestureConfig, PassOutcome, PowerController,
    RefreshScheduler, RenderPipeline, SchedulerConfig, TouchConfig, TouchSampler,
};

use crate::controller::{send_action, Action};
use crate::display_line_buffer::DisplayLineBuffer;
use crate::hardware::{TouchDisplay, TouchWakeLine, Touchpad, DISPLAY_WIDTH};
use crate::tick::{self, EmbassyTickTimer};
use crate::WAKE;

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// slint window, panel and touch input as one render pipeline.
pub struct SlintPipeline<'a> {
    window: Rc<MinimalSoftwareWindow>,
    buffer: DisplayLineBuffer<'a>,
    sampler: TouchSampler<Touchpad>,
    classifier: GestureClassifier,
    last_touch: Option<LogicalPosition>,
}

impl RenderPipeline for SlintPipeline<'_> {
    fn inject_tick(&mut self, elapsed_ms: u32) {
        tick::advance(elapsed_ms);
    }

    fn run_pass(&mut self) -> PassOutcome {
        // Update timers and animations
        slint::platform::update_timers_and_animations();

        let had_input = self.process_touch();

        // Draw the scene if something needs to be drawn
        self.window.draw_if_needed(|renderer| {
            renderer.render_by_line(&mut self.buffer);
        });

        PassOutcome {
            next_delay_ms: self.next_delay_ms(),
            had_input,
        }
    }

    fn slow_tick(&mut self) {
        send_action(Action::RefreshBattery);
    }
}

impl SlintPipeline<'_> {
    /// Poll the touchpad once, classify it and forward it to slint as a
    /// pointer event. Returns whether an event was dispatched.
    fn process_touch(&mut self) -> bool {
        let sample = self.sampler.sample(Instant::now().as_millis());
        self.classifier.process(&sample);

        let button = PointerEventButton::Left;
        let position = LogicalPosition::new(sample.x as f32, sample.y as f32);

        let event = match sample.event {
            RawEvent::PressDown | RawEvent::Contact => match self.last_touch.replace(position) {
                None => WindowEvent::PointerPressed { position, button },
                Some(_) => WindowEvent::PointerMoved { position },
            },
            RawEvent::LiftUp => match self.last_touch.take() {
                Some(_) => WindowEvent::PointerReleased { position, button },
                None => return false,
            },
            // lift never reported (or bus error): release where it was last seen
            RawEvent::NoEvent => match self.last_touch.take() {
                Some(position) => WindowEvent::PointerReleased { position, button },
                None => return false,
            },
        };

        if let Err(e) = self.window.try_dispatch_event(event) {
            warn!("event dispatch failed: {e:?}");
        }
        true
    }

    /// Time until slint needs the next pass. Nothing pending maps to
    /// `u32::MAX`; the scheduler still caps it at the touch poll period.
    fn next_delay_ms(&self) -> u32 {
        if self.window.has_active_animations() {
            return 0;
        }
        slint::platform::duration_until_next_timer_update()
            .map_or(u32::MAX, |d| u32::try_from(d.as_millis()).unwrap_or(u32::MAX))
    }
}

fn on_gesture(gesture: Gesture, _point: TouchPoint) {
    if gesture == Gesture::Tap {
        send_action(Action::Haptic(Effect::SharpTick));
    }
}

#[embassy_executor::task()]
pub async fn render_task(
    window: Rc<MinimalSoftwareWindow>,
    display: TouchDisplay,
    touchpad: Touchpad,
    backlight: Output<'static>,
) {
    let line_buffer = &mut [Rgb565Pixel(0); DISPLAY_WIDTH as usize];

    let mut classifier = GestureClassifier::new(GestureConfig::default());
    classifier.set_handler(on_gesture);

    let pipeline = SlintPipeline {
        window,
        buffer: DisplayLineBuffer::new(display, line_buffer),
        sampler: TouchSampler::with_config(touchpad, &TouchConfig::default()),
        classifier,
        last_touch: None,
    };

    let config = SchedulerConfig::default();
    let power = PowerController::new(
        backlight,
        EmbassyTickTimer,
        TouchWakeLine,
        config.tick_period_ms,
    );

    RefreshScheduler::new(config, pipeline, power)
        .run(&SystemClock, &mut Delay, &WAKE)
        .await
}
