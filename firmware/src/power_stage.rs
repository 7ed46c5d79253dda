// LEDC driven gate of the charger's switching stage

use charger_shared::config::{PWM_DUTY_BITS, PWM_FREQUENCY};
use charger_shared::pwm::PwmOutput;
use esp_hal::gpio::GpioPin;
use esp_hal::ledc::channel::{self, Channel, ChannelHW, ChannelIFace};
use esp_hal::ledc::timer::{self, Timer, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::time::Rate;

const _: () = assert!(PWM_DUTY_BITS == 11, "timer below is configured for 11 bit duty");

pub struct PowerStage {
    channel: Channel<'static, LowSpeed>,
    timer: &'static Timer<'static, LowSpeed>,
    period: u32,
}

impl PowerStage {
    pub fn configure_timer(ledc: &mut Ledc<'static>) -> Timer<'static, LowSpeed> {
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

        let mut lstimer0 = ledc.timer::<LowSpeed>(timer::Number::Timer0);
        lstimer0
            .configure(timer::config::Config {
                duty: timer::config::Duty::Duty11Bit,
                clock_source: timer::LSClockSource::APBClk,
                frequency: Rate::from_hz(PWM_FREQUENCY.raw()),
            })
            .unwrap();
        lstimer0
    }

    pub fn new(
        ledc: &Ledc<'static>,
        timer: &'static Timer<'static, LowSpeed>,
        pin: GpioPin<4>,
    ) -> Self {
        let mut stage = Self {
            channel: ledc.channel(channel::Number::Channel0, pin),
            timer,
            period: 0,
        };
        stage.attach();
        stage
    }

    fn attach(&mut self) {
        // Only fails for a timer that has not been configured
        if self
            .channel
            .configure(channel::config::Config {
                timer: self.timer,
                duty_pct: 0,
                pin_config: channel::config::PinConfig::PushPull,
            })
            .is_err()
        {
            esp_println::println!("LEDC channel configuration failed");
        }
    }
}

impl PwmOutput for PowerStage {
    fn enable(&mut self, period: u32) {
        self.period = period;
        self.attach();
    }

    fn set_low_time(&mut self, low_time: u32) {
        self.channel.set_duty_hw(self.period.saturating_sub(low_time));
    }

    fn release(&mut self) {
        // Zero high time holds the gate low for the whole period
        self.channel.set_duty_hw(0);
    }
}
