//! HD44780 16x2 character LCD in 4-bit mode.
//!
//! Six output pins: register select, enable and the upper data nibble
//! D4..D7. The read/write line is assumed tied low, so the driver never
//! polls the busy flag and waits a fixed time after each transfer instead.
//!
//! # Wiring
//!
//! | LCD | Driver field |
//! |-----|--------------|
//! | RS  | `rs` |
//! | E   | `en` |
//! | D4..D7 | `data[0]..data[3]` |
//! | R/W | GND |

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::traits::SpeedDisplay;

// ============================================================================
// Commands
// ============================================================================

/// 4-bit bus, two lines, 5x7 font.
pub const CMD_FUNCTION_SET: u8 = 0x28;
/// Display on, cursor off, no blink.
pub const CMD_DISPLAY_ON: u8 = 0x0C;
/// Increment address after each write, no shift.
pub const CMD_ENTRY_MODE: u8 = 0x06;
/// Clear display and home the cursor.
pub const CMD_CLEAR: u8 = 0x01;
/// Set DDRAM address to the start of line 1.
pub const CMD_LINE_1: u8 = 0x80;
/// Set DDRAM address to the start of line 2.
pub const CMD_LINE_2: u8 = 0xC0;

/// Wait after each command or character.
const TRANSFER_US: u32 = 5_000;
/// Enable pulse width.
const PULSE_US: u32 = 1;

/// HD44780 driver.
///
/// All six pins share one type; on most HALs that means the erased pin type
/// (`AnyOutputPin` on ESP-IDF).
pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
}

impl<P, D> Hd44780<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Creates a driver. Nothing is sent until [`SpeedDisplay::init`].
    pub fn new(rs: P, en: P, data: [P; 4], delay: D) -> Self {
        Self { rs, en, data, delay }
    }

    /// Releases the pins and the delay provider.
    pub fn release(self) -> (P, P, [P; 4], D) {
        (self.rs, self.en, self.data, self.delay)
    }

    fn put_nibble(&mut self, nibble: u8) -> Result<(), P::Error> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << bit) != 0 {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }
        self.en.set_high()?;
        self.delay.delay_us(PULSE_US);
        self.en.set_low()?;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8, is_data: bool) -> Result<(), P::Error> {
        if is_data {
            self.rs.set_high()?;
        } else {
            self.rs.set_low()?;
        }
        self.put_nibble(byte >> 4)?;
        self.put_nibble(byte & 0x0F)?;
        self.delay.delay_us(TRANSFER_US);
        Ok(())
    }

    /// Sends an instruction byte.
    pub fn command(&mut self, cmd: u8) -> Result<(), P::Error> {
        self.write_byte(cmd, false)
    }

    /// Writes text at the cursor. Non-ASCII characters are shown as `?`.
    pub fn write_str(&mut self, text: &str) -> Result<(), P::Error> {
        for c in text.chars() {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.write_byte(byte, true)?;
        }
        Ok(())
    }

    /// Power-on reset into 4-bit mode.
    fn reset(&mut self) -> Result<(), P::Error> {
        self.rs.set_low()?;
        self.delay.delay_ms(20);
        self.put_nibble(0x3)?;
        self.delay.delay_ms(10);
        self.put_nibble(0x3)?;
        self.delay.delay_ms(1);
        self.put_nibble(0x3)?;
        self.delay.delay_ms(1);
        self.put_nibble(0x2)?;
        self.delay.delay_ms(1);
        Ok(())
    }
}

impl<P, D> SpeedDisplay for Hd44780<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    type Error = P::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.reset()?;
        for cmd in [
            CMD_FUNCTION_SET,
            CMD_DISPLAY_ON,
            CMD_ENTRY_MODE,
            CMD_LINE_1,
            CMD_CLEAR,
        ] {
            self.command(cmd)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.command(CMD_CLEAR)
    }

    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error> {
        self.command(CMD_CLEAR)?;
        self.command(CMD_LINE_1)?;
        self.write_str(line1)?;
        self.command(CMD_LINE_2)?;
        self.write_str(line2)
    }
}
