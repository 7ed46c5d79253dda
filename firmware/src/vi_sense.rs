// Battery voltage and charge current sampling on ADC1

use charger_shared::filter::Filters;
use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::gpio::GpioPin;
use esp_hal::peripherals::ADC1;
use esp_hal::Blocking;

pub struct ViSense {
    adc: Adc<'static, ADC1, Blocking>,
    v_sense: AdcPin<GpioPin<1>, ADC1>,
    i_sense: AdcPin<GpioPin<0>, ADC1>,
}

impl ViSense {
    pub fn new(adc1: ADC1, v_pin: GpioPin<1>, i_pin: GpioPin<0>) -> Self {
        let mut config = AdcConfig::new();
        let v_sense = config.enable_pin(v_pin, Attenuation::_11dB);
        let i_sense = config.enable_pin(i_pin, Attenuation::_11dB);

        Self {
            adc: Adc::new(adc1, config),
            v_sense,
            i_sense,
        }
    }

    /// One conversion burst. A failed conversion drops the whole burst so the
    /// voltage and current filters stay in step.
    pub fn run(&mut self, filters: &mut Filters) {
        let voltage = nb::block!(self.adc.read_oneshot(&mut self.v_sense));
        let current = nb::block!(self.adc.read_oneshot(&mut self.i_sense));

        if let (Ok(voltage), Ok(current)) = (voltage, current) {
            filters.sample(voltage, current);
        }
    }
}
