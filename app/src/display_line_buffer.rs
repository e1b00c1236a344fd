use embedded_graphics_core::pixelcolor::raw::RawU16;
use log::warn;
use slint::platform::software_renderer::{LineBufferProvider, Rgb565Pixel};

use crate::hardware::TouchDisplay;

pub struct DisplayLineBuffer<'a> {
    pub display: TouchDisplay,
    pub line_buffer: &'a mut [Rgb565Pixel],
}

impl DisplayLineBuffer<'_> {
    pub fn new(display: TouchDisplay, line_buffer: &mut [Rgb565Pixel]) -> DisplayLineBuffer<'_> {
        DisplayLineBuffer {
            display,
            line_buffer,
        }
    }
}

impl LineBufferProvider for &mut DisplayLineBuffer<'_> {
    type TargetPixel = Rgb565Pixel;

    fn process_line(
        &mut self,
        line: usize,
        range: core::ops::Range<usize>,
        render_fn: impl FnOnce(&mut [Self::TargetPixel]),
    ) {
        let buffer = &mut self.line_buffer[range.clone()];
        render_fn(buffer);
        if range.is_empty() {
            return;
        }

        // set_pixels takes an inclusive end
        if let Err(e) = self.display.set_pixels(
            range.start as u16,
            line as u16,
            range.end as u16 - 1,
            line as u16,
            buffer.iter().map(|x| RawU16::new(x.0).into()),
        ) {
            warn!("set_pixels failed on line {line}: {e:?}");
        }
    }
}
