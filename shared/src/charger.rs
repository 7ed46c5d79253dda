use core::cmp::Ordering;

use crate::config::{
    CC_CURRENT_MA, CC_VOLTAGE_MV, CV_CUTOFF_MA, CV_VOLTAGE_MV, TICKS_PER_SECOND,
    TRICKLE_VOLTAGE_MV,
};
use crate::display::{Display, TextDisplay};
use crate::fault::{self, Fault};
use crate::filter::Filters;
use crate::measurement::Measurement;
use crate::pwm::{Pwm, PwmOutput};
use crate::state::{Action, ChargeState};

/// Outcome of one pass through the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub next: ChargeState,
    pub action: Action,
    /// Set only on the tick a fault trips.
    pub fault: Option<Fault>,
}

/// The charging state machine, free of side effects.
///
/// The fault check runs first and wins outright, so a battery that fails the
/// check in `CheckBattery` goes straight to `Error` and the PWM is never
/// started.
pub fn step(state: ChargeState, m: &Measurement, button_pressed: bool) -> Step {
    if let Some(fault) = fault::check(state, m.fast_voltage_mv) {
        return Step {
            next: ChargeState::Error,
            action: Action::Stop,
            fault: Some(fault),
        };
    }

    let (next, action) = match state {
        ChargeState::Error => (ChargeState::Error, Action::Stop),
        ChargeState::Calibrate => (ChargeState::Calibrate, Action::None),

        ChargeState::WaitForButton if button_pressed => (ChargeState::CheckBattery, Action::None),
        ChargeState::WaitForButton => (ChargeState::WaitForButton, Action::None),

        // Battery voltage passed the fault check above
        ChargeState::CheckBattery => (ChargeState::ConstantCurrent, Action::Start),

        ChargeState::ConstantCurrent if m.voltage_mv >= CC_VOLTAGE_MV => {
            (ChargeState::ConstantVoltage, Action::None)
        }
        ChargeState::ConstantCurrent => (
            ChargeState::ConstantCurrent,
            regulate(m.current_ma, CC_CURRENT_MA),
        ),

        // Charging current has tapered off, battery is nearly full
        ChargeState::ConstantVoltage if m.current_ma <= CV_CUTOFF_MA => {
            (ChargeState::Trickle, Action::None)
        }
        ChargeState::ConstantVoltage => (
            ChargeState::ConstantVoltage,
            regulate(m.voltage_mv, CV_VOLTAGE_MV),
        ),

        ChargeState::Trickle => (
            ChargeState::Trickle,
            regulate(m.voltage_mv, TRICKLE_VOLTAGE_MV),
        ),
    };

    Step {
        next,
        action,
        fault: None,
    }
}

// One fixed step towards the target, nothing when exactly on it
fn regulate(measured: u32, target: u32) -> Action {
    match measured.cmp(&target) {
        Ordering::Less => Action::Increase,
        Ordering::Greater => Action::Decrease,
        Ordering::Equal => Action::None,
    }
}

pub struct Charger<O> {
    state: ChargeState,
    pwm: Pwm<O>,
    display: Display,
    ticks: u32,
}

impl<O: PwmOutput> Charger<O> {
    /// `button_held` is the start button level sampled at power-up.
    pub fn new(mut pwm: Pwm<O>, button_held: bool) -> Self {
        pwm.stop();

        let state = ChargeState::at_power_up(button_held);
        let mut display = Display::new();
        display.show(state, None, &Measurement::default());

        Self {
            state,
            pwm,
            display,
            ticks: 0,
        }
    }

    /// One control tick. `filters` is a consistent copy of the accumulators.
    pub fn run<D: TextDisplay>(
        &mut self,
        filters: &Filters,
        temperature_c: i8,
        button_pressed: bool,
        lcd: &mut D,
    ) -> Step {
        let m = Measurement::new(filters, temperature_c);
        let step = step(self.state, &m, button_pressed);

        match step.action {
            Action::None => {}
            Action::Start => self.pwm.start(),
            Action::Stop => self.pwm.stop(),
            Action::Increase => self.pwm.increase_duty_cycle(),
            Action::Decrease => self.pwm.decrease_duty_cycle(),
        }
        self.state = step.next;

        self.display.show(self.state, step.fault, &m);
        self.display.write_next_char(lcd);

        self.ticks += 1;
        if self.ticks == TICKS_PER_SECOND {
            self.ticks = 0;
        }

        step
    }

    pub fn state(&self) -> ChargeState {
        self.state
    }

    /// Ticks since the last whole second, wraps at `TICKS_PER_SECOND`.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn pwm(&self) -> &Pwm<O> {
        &self.pwm
    }

    pub fn display(&self) -> &Display {
        &self.display
    }
}
