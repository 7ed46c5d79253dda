use crate::config::{OPEN_VOLTAGE_MV, SHORT_VOLTAGE_MV};
use crate::display::Line;
use crate::state::ChargeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    ShortOrDisconnected,
    OpenCircuit,
}

impl Fault {
    pub fn message(self) -> &'static Line {
        match self {
            Fault::ShortOrDisconnected => b"Short/no battery",
            Fault::OpenCircuit => b"Open, no battery",
        }
    }
}

/// Single-sample decision on the fast filter. The filter's ~64 sample settling
/// time is the only debounce.
pub fn check(state: ChargeState, fast_voltage_mv: u32) -> Option<Fault> {
    if !state.checks_faults() {
        return None;
    }

    if fast_voltage_mv < SHORT_VOLTAGE_MV {
        Some(Fault::ShortOrDisconnected)
    } else if fast_voltage_mv > OPEN_VOLTAGE_MV {
        Some(Fault::OpenCircuit)
    } else {
        None
    }
}
