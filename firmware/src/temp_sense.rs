// Simple LM75B digital temperature sensor interface

use embedded_hal::i2c::I2c;
use zerocopy::IntoBytes;

const ADDRESS: u8 = 0x4F;

// The MSB is whole degrees C in twos complement, the LSB only carries the
// 0.125C fraction, throw it away. The status line only shows -9C to 99C
pub fn board_temp_c<T: I2c>(i2c: &mut T) -> Result<i8, T::Error> {
    let mut data: i16 = 0;
    i2c.read(ADDRESS, data.as_mut_bytes())?;
    // Rust gives us an arithmetic shift since data is an i16
    Ok((i16::from_be(data) >> 8) as i8)
}
