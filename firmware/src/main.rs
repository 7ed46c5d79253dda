#![no_std]
#![no_main]

mod lcd;
mod power_stage;
mod temp_sense;
mod vi_sense;

use esp_backtrace as _;
use portable_atomic::{AtomicI8, AtomicU32};

// riscv32imc has no atomic instructions, portable-atomic falls back to the
// critical-section implementation provided by esp-hal
static SECONDS: AtomicU32 = AtomicU32::new(0);
static TEMPERATURE_C: AtomicI8 = AtomicI8::new(0);

#[rtic::app(device = esp32c3, dispatchers = [])]
mod app {
    use super::{period_of, SECONDS, TEMPERATURE_C};
    use crate::lcd::Lcd;
    use crate::power_stage::PowerStage;
    use crate::temp_sense;
    use crate::vi_sense::ViSense;

    use charger_shared::charger::Charger;
    use charger_shared::config::{ADC_SAMPLE_RATE, TICK_RATE};
    use charger_shared::filter::Filters;
    use charger_shared::pwm::{self, Pwm};
    use esp_hal::delay::Delay;
    use esp_hal::gpio::{AnyPin, Input, InputConfig, Level, Output, OutputConfig, Pull};
    use esp_hal::i2c::master::{Config as I2cConfig, I2c};
    use esp_hal::ledc::timer::Timer;
    use esp_hal::ledc::{Ledc, LowSpeed};
    use esp_hal::time::Rate;
    use esp_hal::timer::timg::TimerGroup;
    use esp_hal::timer::PeriodicTimer;
    use esp_hal::Blocking;
    use esp_println::println;
    use portable_atomic::Ordering;

    #[shared]
    struct Shared {
        filters: Filters,
    }

    #[local]
    struct Local {
        sample_timer: PeriodicTimer<'static, Blocking>,
        vi_sense: ViSense,
        tick_timer: PeriodicTimer<'static, Blocking>,
        charger: Charger<PowerStage>,
        lcd: Lcd<Delay>,
        button: Input<'static>,
        tick_flag: Output<'static>,
        i2c: I2c<'static, Blocking>,
    }

    #[init(local = [
        ledc: Option<Ledc<'static>> = None,
        pwm_timer: Option<Timer<'static, LowSpeed>> = None,
    ])]
    fn init(cx: init::Context) -> (Shared, Local) {
        let peripherals = esp_hal::init(esp_hal::Config::default());
        println!("booted!");

        let ledc = cx.local.ledc.insert(Ledc::new(peripherals.LEDC));
        let pwm_timer = cx.local.pwm_timer.insert(PowerStage::configure_timer(ledc));
        let stage = PowerStage::new(ledc, pwm_timer, peripherals.GPIO4);

        // Start button pulls to ground, held at reset selects calibration
        let button = Input::new(peripherals.GPIO9, InputConfig::default().with_pull(Pull::Up));
        let charger = Charger::new(Pwm::new(pwm::Config::default(), stage), button.is_low());
        println!("mode: {:?}", charger.state());

        let vi_sense = ViSense::new(peripherals.ADC1, peripherals.GPIO1, peripherals.GPIO0);

        let output = |pin: AnyPin| Output::new(pin, Level::Low, OutputConfig::default());
        let mut lcd = Lcd::new(
            output(peripherals.GPIO2.into()),
            output(peripherals.GPIO3.into()),
            [
                output(peripherals.GPIO5.into()),
                output(peripherals.GPIO6.into()),
                output(peripherals.GPIO7.into()),
                output(peripherals.GPIO21.into()),
            ],
            Delay::new(),
        );
        lcd.init();

        // High for as long as the tick task runs, for timing it on a scope
        let tick_flag = output(peripherals.GPIO20.into());

        let i2c = I2c::new(
            peripherals.I2C0,
            I2cConfig::default().with_frequency(Rate::from_khz(100)),
        )
        .unwrap()
        .with_sda(peripherals.GPIO10)
        .with_scl(peripherals.GPIO8);

        let timg0 = TimerGroup::new(peripherals.TIMG0);
        let mut sample_timer = PeriodicTimer::new(timg0.timer0);
        sample_timer.enable_interrupt(true);
        sample_timer.start(period_of(ADC_SAMPLE_RATE)).unwrap();

        // Sampling runs at a higher priority than the tick, so an accumulator
        // copy taken by the tick is never half written
        let timg1 = TimerGroup::new(peripherals.TIMG1);
        let mut tick_timer = PeriodicTimer::new(timg1.timer0);
        tick_timer.enable_interrupt(true);
        tick_timer.start(period_of(TICK_RATE)).unwrap();

        (
            Shared {
                filters: Filters::new(),
            },
            Local {
                sample_timer,
                vi_sense,
                tick_timer,
                charger,
                lcd,
                button,
                tick_flag,
                i2c,
            },
        )
    }

    // Blocking I2C lives here so both timer tasks can preempt it
    #[idle(local = [i2c])]
    fn idle(cx: idle::Context) -> ! {
        let mut last_second = u32::MAX;
        loop {
            let second = SECONDS.load(Ordering::Relaxed);
            if second == last_second {
                continue;
            }
            last_second = second;

            match temp_sense::board_temp_c(cx.local.i2c) {
                Ok(temp_c) => TEMPERATURE_C.store(temp_c, Ordering::Relaxed),
                Err(e) => println!("LM75 read failed: {:?}", e),
            }
        }
    }

    #[task(binds = TG0_T0_LEVEL, priority = 3, shared = [filters], local = [sample_timer, vi_sense])]
    fn sample(mut cx: sample::Context) {
        cx.local.sample_timer.clear_interrupt();

        let vi_sense = cx.local.vi_sense;
        cx.shared.filters.lock(|filters| vi_sense.run(filters));
    }

    #[task(binds = TG1_T0_LEVEL, priority = 2, shared = [filters], local = [tick_timer, charger, lcd, button, tick_flag])]
    fn tick(mut cx: tick::Context) {
        cx.local.tick_flag.set_high();
        cx.local.tick_timer.clear_interrupt();

        let filters = cx.shared.filters.lock(|filters| *filters);
        let charger = cx.local.charger;
        let previous = charger.state();

        let step = charger.run(
            &filters,
            TEMPERATURE_C.load(Ordering::Relaxed),
            cx.local.button.is_low(),
            cx.local.lcd,
        );

        if let Some(fault) = step.fault {
            println!("fault: {:?}", fault);
        }
        if step.next != previous {
            println!(
                "{:?} -> {:?}, duty {}/1000",
                previous,
                step.next,
                charger.pwm().duty_permille()
            );
        }

        if charger.ticks() == 0 {
            SECONDS.fetch_add(1, Ordering::Relaxed);
        }

        cx.local.tick_flag.set_low();
    }
}

fn period_of(rate: fugit::HertzU32) -> esp_hal::time::Duration {
    let period: fugit::MicrosDurationU32 = rate.into_duration();
    esp_hal::time::Duration::from_micros(u64::from(period.ticks()))
}
