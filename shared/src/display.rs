//! Text shown on the 16x2 character LCD.
//!
//! The tick loop owns a [`Display`], rewrites its lines as the charger changes
//! state, and pushes a single character per tick so the LCD's slow bus timing
//! never stretches a tick.

use core::fmt::Write;

use heapless::String;

use crate::fault::Fault;
use crate::measurement::{tenths, Measurement};
use crate::state::ChargeState;

pub const COLUMNS: usize = 16;
pub const ROWS: usize = 2;

pub type Line = [u8; COLUMNS];

/// HD44780 "set DDRAM address" command and the start address of each row.
pub const SET_DDRAM_ADDRESS: u8 = 0x80;
pub const ROW_ADDRESS: [u8; ROWS] = [0x00, 0x40];

/// Degree sign in the HD44780 A00 character ROM.
pub const DEGREE: u8 = 0xDF;

const BLANK: Line = [b' '; COLUMNS];

/// Anything that can take HD44780-style commands and character data.
pub trait TextDisplay {
    fn command(&mut self, command: u8);
    fn data(&mut self, byte: u8);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    lines: [Line; ROWS],
    row: usize,
    col: usize,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl Display {
    pub const fn new() -> Self {
        Self {
            lines: [BLANK; ROWS],
            row: 0,
            col: 0,
        }
    }

    pub fn top(&self) -> &Line {
        &self.lines[0]
    }

    pub fn bottom(&self) -> &Line {
        &self.lines[1]
    }

    /// Refresh both lines for the state the charger is now in. `fault` is the
    /// fault that tripped this tick, if any; its description replaces the
    /// bottom line and stays there for as long as the charger is stopped.
    pub fn show(&mut self, state: ChargeState, fault: Option<Fault>, m: &Measurement) {
        match state {
            ChargeState::Error => {
                self.lines[0] = *b"Charging stopped";
                if let Some(fault) = fault {
                    self.lines[1] = *fault.message();
                }
            }
            ChargeState::Calibrate => {
                self.lines[0] = *b"Calibration mode";
                self.lines[1] = voltage_line(m);
            }
            ChargeState::WaitForButton => {
                self.lines[0] = *b"Press button to ";
                self.lines[1] = *b"  start charging";
            }
            ChargeState::CheckBattery => {
                self.lines[0] = *b"Checking battery";
                self.lines[1] = status_line(m);
            }
            ChargeState::ConstantCurrent => {
                self.lines[0] = *b"Constant Current";
                self.lines[1] = status_line(m);
            }
            ChargeState::ConstantVoltage => {
                self.lines[0] = *b"Constant Voltage";
                self.lines[1] = status_line(m);
            }
            ChargeState::Trickle => {
                self.lines[0] = *b"Trickle Charge  ";
                self.lines[1] = status_line(m);
            }
        }
    }

    /// Emits exactly one operation: the next character of the current row, or
    /// after the last column, the address command that moves to the other row.
    pub fn write_next_char<D: TextDisplay>(&mut self, lcd: &mut D) {
        if self.col >= COLUMNS {
            self.col = 0;
            self.row = (self.row + 1) % ROWS;
            lcd.command(SET_DDRAM_ADDRESS | ROW_ADDRESS[self.row]);
        } else {
            lcd.data(self.lines[self.row][self.col]);
            self.col += 1;
        }
    }
}

/// `14.4V 1.8A  25°C`
pub fn status_line(m: &Measurement) -> Line {
    let (volts, volt_tenths) = tenths(m.voltage_mv.min(99_949));
    let (amps, amp_tenths) = tenths(m.current_ma.min(9_949));
    let temperature = m.temperature_c.clamp(-9, 99);

    let mut text: String<COLUMNS> = String::new();
    // Clamped above so the text is always 14 characters
    write!(
        text,
        "{volts:02}.{volt_tenths}V {amps}.{amp_tenths}A  {temperature:>2}"
    )
    .ok();

    let mut line = pad(&text);
    line[COLUMNS - 2] = DEGREE;
    line[COLUMNS - 1] = b'C';
    line
}

/// `14.4V` followed by blanks.
pub fn voltage_line(m: &Measurement) -> Line {
    let (volts, volt_tenths) = tenths(m.voltage_mv.min(99_949));

    let mut text: String<COLUMNS> = String::new();
    write!(text, "{volts:02}.{volt_tenths}V").ok();
    pad(&text)
}

fn pad(text: &str) -> Line {
    let mut line = BLANK;
    for (dst, src) in line.iter_mut().zip(text.bytes()) {
        *dst = src;
    }
    line
}
