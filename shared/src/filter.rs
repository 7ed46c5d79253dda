use crate::config::{FAST_WINDOW, SLOW_WINDOW};

/// Exponential-decay moving average over a window of `N` samples.
///
/// The accumulator holds roughly `N` times the average sample, so it must be
/// divided by `N` when converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovingAverage<const N: u32> {
    acc: u32,
}

impl<const N: u32> MovingAverage<N> {
    pub const WINDOW: u32 = N;

    pub const fn new() -> Self {
        Self { acc: 0 }
    }

    pub fn update(&mut self, sample: u16) {
        self.acc = self.acc - self.acc / N + u32::from(sample);
    }

    pub fn accumulator(&self) -> u32 {
        self.acc
    }
}

/// Accumulators fed by every ADC conversion burst.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters {
    /// Short window, used only for fault detection.
    pub fast_voltage: MovingAverage<FAST_WINDOW>,
    pub voltage: MovingAverage<SLOW_WINDOW>,
    pub current: MovingAverage<SLOW_WINDOW>,
}

impl Filters {
    pub const fn new() -> Self {
        Self {
            fast_voltage: MovingAverage::new(),
            voltage: MovingAverage::new(),
            current: MovingAverage::new(),
        }
    }

    pub fn sample(&mut self, voltage: u16, current: u16) {
        self.current.update(current);
        self.voltage.update(voltage);
        self.fast_voltage.update(voltage);
    }
}
