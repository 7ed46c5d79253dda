#![cfg_attr(not(test), no_std)]

pub mod charger;
pub mod config;
pub mod display;
pub mod fault;
pub mod filter;
pub mod measurement;
pub mod pwm;

pub mod state {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum ChargeState {
        /// Stopped after a short or open battery. Terminal until reset.
        Error,
        /// Entered when the start button is held at power-up. Shows the
        /// measured voltage without switching the PWM on. Terminal.
        Calibrate,
        #[default]
        WaitForButton,
        /// Lasts exactly one tick: first fault check with a battery attached,
        /// before the PWM is started.
        CheckBattery,
        ConstantCurrent,
        ConstantVoltage,
        /// Float charge at a lower voltage, safe to stay in indefinitely.
        Trickle,
    }

    impl ChargeState {
        pub fn at_power_up(button_held: bool) -> Self {
            if button_held {
                ChargeState::Calibrate
            } else {
                ChargeState::WaitForButton
            }
        }

        /// States with a battery on the terminals, where short/open checks apply.
        pub fn checks_faults(self) -> bool {
            matches!(
                self,
                ChargeState::CheckBattery
                    | ChargeState::ConstantCurrent
                    | ChargeState::ConstantVoltage
                    | ChargeState::Trickle
            )
        }
    }

    /// What the transition table asks of the duty-cycle actuator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Action {
        #[default]
        None,
        Start,
        Stop,
        Increase,
        Decrease,
    }
}
