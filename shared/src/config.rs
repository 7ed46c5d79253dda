// Build-time configuration for a 6-cell (12V nominal) flooded lead-acid battery
// on the ESP32-C3 analog front end.

use fugit::HertzU32;

pub const TICK_RATE: HertzU32 = HertzU32::Hz(100);
pub const TICKS_PER_SECOND: u32 = TICK_RATE.raw();

pub const ADC_SAMPLE_RATE: HertzU32 = HertzU32::kHz(5);
pub const SAMPLES_PER_TICK: u32 = ADC_SAMPLE_RATE.raw() / TICK_RATE.raw();

// 11dB attenuation gives roughly 0-2.5V at the pin
pub const ADC_FULL_SCALE_MV: u32 = 2_500;
pub const ADC_BITS: u32 = 12;
pub const ADC_COUNTS: u32 = 1 << ADC_BITS;

// 60k/10k divider on the battery terminal
pub const V_SCALE_NUMERATOR: u32 = 7_000;
pub const V_SCALE_DENOMINATOR: u32 = 1_000;
pub const V_MAX_MV: u32 = ADC_FULL_SCALE_MV * V_SCALE_NUMERATOR / V_SCALE_DENOMINATOR;

// Current sense amplifier outputs 1mV per mA
pub const I_SCALE_NUMERATOR: u32 = 1_000;
pub const I_SCALE_DENOMINATOR: u32 = 1_000;
pub const I_MAX_MA: u32 = ADC_FULL_SCALE_MV * I_SCALE_NUMERATOR / I_SCALE_DENOMINATOR;

pub const FAST_WINDOW: u32 = 64;
pub const SLOW_WINDOW: u32 = 512;

pub const SHORT_VOLTAGE_MV: u32 = 11_000;
pub const OPEN_VOLTAGE_MV: u32 = 15_000;

// Bulk stage: hold current until the battery reaches absorption voltage
pub const CC_VOLTAGE_MV: u32 = 14_400;
pub const CC_CURRENT_MA: u32 = 1_800;

// Absorption stage: hold voltage until current tapers off
pub const CV_VOLTAGE_MV: u32 = 14_400;
pub const CV_CUTOFF_MA: u32 = 100;

pub const TRICKLE_VOLTAGE_MV: u32 = 12_900;

// APB / 25kHz = 3200 counts available, so 11 bits fit
pub const PWM_FREQUENCY: HertzU32 = HertzU32::kHz(25);
pub const PWM_DUTY_BITS: u32 = 11;
pub const PWM_PERIOD: u32 = 1 << PWM_DUTY_BITS;
pub const PWM_UP_SHIFT: u32 = 9;
pub const PWM_DOWN_SHIFT: u32 = 9;
