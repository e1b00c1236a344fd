use drivers::ft5436::Rotation;

/// Length of the gesture point history when none is chosen
pub const DEFAULT_HISTORY_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    /// Maximum per-axis movement between samples for a hold to arm a drag
    pub drag_deviation_px: u16,
    /// Hold time after press before a drag can start
    pub drag_arm_ms: u64,
    /// Longest press-to-lift time still reported as a tap
    pub tap_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_deviation_px: 5,
            drag_arm_ms: 300,
            tap_window_ms: 900,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Inactivity after which the display is blanked and refresh suspended
    pub idle_timeout_ms: u64,
    pub min_delay_ms: u32,
    pub max_delay_ms: u32,
    /// Period of the toolkit tick source
    pub tick_period_ms: u32,
    /// Interval of the low-rate UI refresh hook (battery label)
    pub slow_tick_ms: u32,
    /// Longest sleep between touch reads while Active. The wake interrupt
    /// is masked then, and the controller only latches the last event.
    pub touch_poll_ms: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 10_000,
            min_delay_ms: 1,
            max_delay_ms: 500,
            tick_period_ms: 33,
            slow_tick_ms: 1_000,
            touch_poll_ms: 30,
        }
    }
}

impl SchedulerConfig {
    /// Normalise the delay bounds: ordered, and never below 1ms.
    pub fn validated(mut self) -> Self {
        if self.min_delay_ms > self.max_delay_ms {
            core::mem::swap(&mut self.min_delay_ms, &mut self.max_delay_ms);
        }
        self.min_delay_ms = self.min_delay_ms.max(1);
        self.max_delay_ms = self.max_delay_ms.max(self.min_delay_ms);
        self.touch_poll_ms = self.touch_poll_ms.clamp(self.min_delay_ms, self.max_delay_ms);
        self
    }

    /// Bound a suggested delay to `[min_delay_ms, touch_poll_ms]`.
    pub fn clamp_delay(&self, suggested_ms: u32) -> u32 {
        suggested_ms
            .min(self.touch_poll_ms)
            .clamp(self.min_delay_ms, self.max_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchConfig {
    pub rotation: Rotation,
    pub width: u16,
    pub height: u16,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            rotation: Rotation::Deg0,
            width: 240,
            height: 240,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_swaps_inverted_bounds() {
        let config = SchedulerConfig {
            min_delay_ms: 800,
            max_delay_ms: 20,
            ..SchedulerConfig::default()
        }
        .validated();
        assert_eq!((config.min_delay_ms, config.max_delay_ms), (20, 800));
    }

    #[test]
    fn test_validated_raises_zero_minimum() {
        let config = SchedulerConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
            ..SchedulerConfig::default()
        }
        .validated();
        assert_eq!((config.min_delay_ms, config.max_delay_ms), (1, 1));
    }

    #[test]
    fn test_validated_keeps_touch_poll_within_bounds() {
        let config = SchedulerConfig {
            touch_poll_ms: 0,
            ..SchedulerConfig::default()
        }
        .validated();
        assert_eq!(config.touch_poll_ms, 1);

        let config = SchedulerConfig {
            touch_poll_ms: 5_000,
            ..SchedulerConfig::default()
        }
        .validated();
        assert_eq!(config.touch_poll_ms, 500);
    }

    #[test]
    fn test_clamp_delay() {
        let config = SchedulerConfig::default();
        assert_eq!(config.clamp_delay(0), 1);
        assert_eq!(config.clamp_delay(20), 20);
        assert_eq!(config.clamp_delay(33), 30);
        assert_eq!(config.clamp_delay(u32::MAX), 30);
    }

    #[test]
    fn test_clamp_delay_upper_bound_without_poll_cap() {
        let config = SchedulerConfig {
            touch_poll_ms: 500,
            ..SchedulerConfig::default()
        };
        assert_eq!(config.clamp_delay(u32::MAX), 500);
    }
}
