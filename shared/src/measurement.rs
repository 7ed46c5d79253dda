use crate::config::{ADC_COUNTS, I_MAX_MA, V_MAX_MV};
use crate::filter::{Filters, MovingAverage};

/// Physical readings for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Measurement {
    pub fast_voltage_mv: u32,
    pub voltage_mv: u32,
    pub current_ma: u32,
    pub temperature_c: i8,
}

impl Measurement {
    pub fn new(filters: &Filters, temperature_c: i8) -> Self {
        Self {
            fast_voltage_mv: convert(&filters.fast_voltage, V_MAX_MV),
            voltage_mv: convert(&filters.voltage, V_MAX_MV),
            current_ma: convert(&filters.current, I_MAX_MA),
            temperature_c,
        }
    }
}

fn convert<const N: u32>(filter: &MovingAverage<N>, full_scale: u32) -> u32 {
    to_physical(filter.accumulator(), N, full_scale)
}

/// Scales a filter accumulator to mV or mA. `full_scale` is the value an ADC
/// reading of 2^ADC_BITS would represent.
pub const fn to_physical(acc: u32, window: u32, full_scale: u32) -> u32 {
    // 512 samples of 4095 times a 17.5V full scale does not fit in 32 bits
    let scaled = acc as u64 * full_scale as u64 / (window as u64 * ADC_COUNTS as u64);
    scaled as u32
}

/// Rounds to the nearest tenth and splits into whole and tenth digits, so
/// readings hovering around a boundary do not flicker.
pub const fn tenths(milli: u32) -> (u32, u32) {
    let rounded = milli.saturating_add(50);
    (rounded / 1000, rounded / 100 % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FAST_WINDOW, SAMPLES_PER_TICK, SLOW_WINDOW};

    fn raw_for_mv(mv: u32) -> u16 {
        (mv * ADC_COUNTS / V_MAX_MV) as u16
    }

    #[test]
    fn converges_within_one_lsb_after_window_ticks() {
        let sample = raw_for_mv(13_200);
        let expected_mv = to_physical(u32::from(sample), 1, V_MAX_MV);
        let expected_ma = to_physical(u32::from(sample), 1, I_MAX_MA);

        let mut filters = Filters::new();
        for _ in 0..FAST_WINDOW * SAMPLES_PER_TICK {
            filters.sample(sample, sample);
        }
        let m = Measurement::new(&filters, 0);
        assert!(m.fast_voltage_mv.abs_diff(expected_mv) <= 1);

        for _ in FAST_WINDOW * SAMPLES_PER_TICK..SLOW_WINDOW * SAMPLES_PER_TICK {
            filters.sample(sample, sample);
        }
        let m = Measurement::new(&filters, 0);
        assert!(m.voltage_mv.abs_diff(expected_mv) <= 1);
        assert!(m.current_ma.abs_diff(expected_ma) <= 1);
    }

    #[test]
    fn full_scale_accumulator() {
        let acc = SLOW_WINDOW * ADC_COUNTS;
        assert_eq!(to_physical(acc, SLOW_WINDOW, V_MAX_MV), V_MAX_MV);
        assert_eq!(to_physical(acc, SLOW_WINDOW, I_MAX_MA), I_MAX_MA);
        assert_eq!(to_physical(0, SLOW_WINDOW, V_MAX_MV), 0);
    }

    #[test]
    fn window_length_is_divided_out() {
        let half = ADC_COUNTS / 2;
        assert_eq!(
            to_physical(FAST_WINDOW * half, FAST_WINDOW, V_MAX_MV),
            to_physical(SLOW_WINDOW * half, SLOW_WINDOW, V_MAX_MV),
        );
    }

    #[test]
    fn rounds_to_nearest_tenth() {
        assert_eq!(tenths(14_349), (14, 3));
        assert_eq!(tenths(14_350), (14, 4));
        assert_eq!(tenths(1_799), (1, 8));
        assert_eq!(tenths(49), (0, 0));
        assert_eq!(tenths(9_960), (10, 0));
    }

    #[test]
    fn temperature_passes_through() {
        let m = Measurement::new(&Filters::new(), -7);
        assert_eq!(m.temperature_c, -7);
        assert_eq!(m.voltage_mv, 0);
    }
}
