// Fixed-step duty cycle control of the charger's power switch

use crate::config::{PWM_DOWN_SHIFT, PWM_PERIOD, PWM_UP_SHIFT};

/// Hardware side of the actuator. Timing is expressed as low time, in timer
/// counts, within a period.
pub trait PwmOutput {
    /// Attach the timer to the switch pin with the given period.
    fn enable(&mut self, period: u32);
    fn set_low_time(&mut self, low_time: u32);
    /// Park the switch pin at its inactive (off) level.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub period: u32,
    pub up_shift: u32,
    pub down_shift: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            period: PWM_PERIOD,
            up_shift: PWM_UP_SHIFT,
            down_shift: PWM_DOWN_SHIFT,
        }
    }
}

#[derive(Debug)]
pub struct Pwm<O> {
    config: Config,
    output: O,
    low_time: u32,
    up_step: u32,
    down_step: u32,
}

impl<O: PwmOutput> Pwm<O> {
    pub fn new(config: Config, output: O) -> Self {
        Self {
            config,
            output,
            low_time: config.period,
            up_step: step_size(config.period, config.up_shift),
            down_step: step_size(config.period, config.down_shift),
        }
    }

    /// Begins switching at 0% duty.
    pub fn start(&mut self) {
        let period = self.config.period;
        self.output.enable(period);

        self.low_time = period;
        self.up_step = step_size(period, self.config.up_shift);
        self.down_step = step_size(period, self.config.down_shift);
        self.output.set_low_time(self.low_time);
    }

    pub fn stop(&mut self) {
        self.low_time = self.config.period;
        self.output.set_low_time(self.low_time);
        self.output.release();
    }

    pub fn increase_duty_cycle(&mut self) {
        self.low_time = self.low_time.saturating_sub(self.up_step);
        self.output.set_low_time(self.low_time);
    }

    /// Never pushes the duty cycle all the way to 0% while regulating.
    pub fn decrease_duty_cycle(&mut self) {
        let period = self.config.period;
        if self.low_time < period {
            self.low_time = (self.low_time + self.down_step).min(period - 1);
        }
        self.output.set_low_time(self.low_time);
    }

    /// Fixed at construction, so the low time always stays within the period.
    pub fn config(&self) -> Config {
        self.config
    }

    pub fn low_time(&self) -> u32 {
        self.low_time
    }

    pub fn up_step(&self) -> u32 {
        self.up_step
    }

    pub fn down_step(&self) -> u32 {
        self.down_step
    }

    /// Duty cycle in tenths of a percent.
    pub fn duty_permille(&self) -> u32 {
        let period = self.config.period.max(1);
        (period - self.low_time) * 1000 / period
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

// At least one count so short periods still make progress
fn step_size(period: u32, shift: u32) -> u32 {
    period.checked_shr(shift).unwrap_or(0).max(1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    pub struct Recorder {
        pub period: Option<u32>,
        pub low_time: Option<u32>,
        pub releases: u32,
    }

    impl PwmOutput for Recorder {
        fn enable(&mut self, period: u32) {
            self.period = Some(period);
        }

        fn set_low_time(&mut self, low_time: u32) {
            self.low_time = Some(low_time);
        }

        fn release(&mut self) {
            self.releases += 1;
        }
    }

    fn started() -> Pwm<Recorder> {
        let mut pwm = Pwm::new(Config::default(), Recorder::default());
        pwm.start();
        pwm
    }

    #[test]
    fn start_is_zero_duty() {
        let pwm = started();
        assert_eq!(pwm.low_time(), PWM_PERIOD);
        assert_eq!(pwm.duty_permille(), 0);
        assert_eq!(pwm.output().period, Some(PWM_PERIOD));
        assert_eq!(pwm.output().low_time, Some(PWM_PERIOD));
        assert_eq!(pwm.up_step(), PWM_PERIOD >> PWM_UP_SHIFT);
    }

    #[test]
    fn step_never_below_one() {
        let config = Config {
            period: 100,
            up_shift: 9,
            down_shift: 40,
        };
        let pwm = Pwm::new(config, Recorder::default());
        assert_eq!(pwm.up_step(), 1);
        assert_eq!(pwm.down_step(), 1);
    }

    #[test]
    fn increase_reaches_zero_without_wrapping() {
        let mut pwm = started();
        let bound = pwm.low_time().div_ceil(pwm.up_step());
        let mut calls = 0;
        while pwm.low_time() > 0 {
            pwm.increase_duty_cycle();
            calls += 1;
        }
        assert!(calls <= bound);

        pwm.increase_duty_cycle();
        assert_eq!(pwm.low_time(), 0);
        assert_eq!(pwm.duty_permille(), 1000);
    }

    #[test]
    fn increase_from_odd_low_time() {
        let config = Config {
            period: 1000,
            up_shift: 3,
            down_shift: 3,
        };
        let mut pwm = Pwm::new(config, Recorder::default());
        pwm.start();
        pwm.decrease_duty_cycle();
        pwm.increase_duty_cycle(); // 1000 -> 875
        pwm.decrease_duty_cycle(); // 875 -> 999
        assert_eq!(pwm.low_time(), 999);

        let bound = 999u32.div_ceil(125);
        for _ in 0..bound {
            pwm.increase_duty_cycle();
        }
        assert_eq!(pwm.low_time(), 0);
    }

    #[test]
    fn decrease_stays_below_period() {
        let mut pwm = started();
        for _ in 0..10 {
            pwm.increase_duty_cycle();
        }
        for _ in 0..1000 {
            pwm.decrease_duty_cycle();
            assert!(pwm.low_time() < PWM_PERIOD);
        }
        assert_eq!(pwm.low_time(), PWM_PERIOD - 1);
    }

    #[test]
    fn decrease_at_zero_duty_is_a_no_op() {
        let mut pwm = started();
        pwm.decrease_duty_cycle();
        assert_eq!(pwm.low_time(), PWM_PERIOD);
    }

    #[test]
    fn low_time_stays_within_configured_period() {
        let config = Config {
            period: 100,
            up_shift: 2,
            down_shift: 3,
        };
        let mut pwm = Pwm::new(config, Recorder::default());
        pwm.start();
        assert_eq!(pwm.config(), config);
        for i in 0..200 {
            if i % 3 == 0 {
                pwm.decrease_duty_cycle();
            } else {
                pwm.increase_duty_cycle();
            }
            assert!(pwm.low_time() <= pwm.config().period);
            assert!(pwm.duty_permille() <= 1000);
        }
        pwm.stop();
        assert_eq!(pwm.low_time(), pwm.config().period);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut pwm = started();
        for _ in 0..50 {
            pwm.increase_duty_cycle();
        }

        pwm.stop();
        let first = (pwm.low_time(), pwm.output().low_time);
        pwm.stop();
        let second = (pwm.low_time(), pwm.output().low_time);

        assert_eq!(first, (PWM_PERIOD, Some(PWM_PERIOD)));
        assert_eq!(first, second);
        assert_eq!(pwm.output().releases, 2);
    }
}
