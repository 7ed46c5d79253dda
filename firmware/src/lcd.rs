// HD44780 16x2 character LCD on a 4-bit parallel bus, R/W tied to ground

use bitfield::bitfield;
use charger_shared::display::TextDisplay;
use embedded_hal::delay::DelayNs;
use esp_hal::gpio::Output;

// Setup / hold times for the 3.3V ADM1602K, with margin
const ENABLE_SETUP_NS: u32 = 100;
const ENABLE_HIGH_NS: u32 = 450;
const ENABLE_LOW_NS: u32 = 500;
// Longest instruction other than clear / home
const EXECUTION_US: u32 = 40;
const CLEAR_US: u32 = 1_600;

const CLEAR_DISPLAY: u8 = 0x01;

bitfield! {
    pub struct EntryMode(u8);
    impl Debug;
    _, set_increment: 1;
    _, set_shift: 0;
}

bitfield! {
    pub struct DisplayControl(u8);
    impl Debug;
    _, set_display_on: 2;
    _, set_cursor_on: 1;
    _, set_blink: 0;
}

bitfield! {
    pub struct FunctionSet(u8);
    impl Debug;
    _, set_eight_bit: 4;
    _, set_two_lines: 3;
    _, set_font_5x10: 2;
}

pub struct Lcd<D> {
    rs: Output<'static>,
    en: Output<'static>,
    data: [Output<'static>; 4],
    delay: D,
}

impl<D: DelayNs> Lcd<D> {
    /// `data` is D4..D7 in order.
    pub fn new(
        rs: Output<'static>,
        en: Output<'static>,
        data: [Output<'static>; 4],
        delay: D,
    ) -> Self {
        Self { rs, en, data, delay }
    }

    pub fn init(&mut self) {
        // Controller needs >40ms after VCC rises before it accepts anything
        self.delay.delay_ms(125);

        // Three resets in 8-bit mode, then switch to 4-bit
        self.rs.set_low();
        for wait_us in [4_500, 150, EXECUTION_US] {
            self.write_nibble(0x3);
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(0x2);
        self.delay.delay_us(EXECUTION_US);

        let mut function = FunctionSet(0x20);
        function.set_eight_bit(false);
        function.set_two_lines(true);
        function.set_font_5x10(false);
        self.write_command(function.0);

        let mut control = DisplayControl(0x08);
        control.set_display_on(true);
        control.set_cursor_on(false);
        control.set_blink(false);
        self.write_command(control.0);

        let mut entry = EntryMode(0x04);
        entry.set_increment(true);
        entry.set_shift(false);
        self.write_command(entry.0);

        self.write_command(CLEAR_DISPLAY);
        self.delay.delay_us(CLEAR_US);
    }

    fn write_command(&mut self, command: u8) {
        self.rs.set_low();
        self.write_byte(command);
        self.delay.delay_us(EXECUTION_US);
    }

    fn write_byte(&mut self, byte: u8) {
        self.write_nibble(byte >> 4);
        self.write_nibble(byte & 0x0F);
    }

    fn write_nibble(&mut self, nibble: u8) {
        self.delay.delay_ns(ENABLE_SETUP_NS);
        self.en.set_high();
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << bit) != 0 {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
        self.delay.delay_ns(ENABLE_HIGH_NS);
        // Data is latched on the falling edge
        self.en.set_low();
        self.delay.delay_ns(ENABLE_LOW_NS);
    }
}

// Called at the tick rate, which is far slower than any instruction, so no
// busy wait is needed between characters.
impl<D: DelayNs> TextDisplay for Lcd<D> {
    fn command(&mut self, command: u8) {
        self.rs.set_low();
        self.write_byte(command);
    }

    fn data(&mut self, byte: u8) {
        self.rs.set_high();
        self.write_byte(byte);
    }
}
