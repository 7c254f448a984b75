//! ESP32-C3 SuperMini hardware abstraction layer for the wheel speedometer.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini (RISC-V 160MHz, 4MB Flash)
//! - **Time base**: general-purpose timer group 0, timer 0, at 1 MHz
//! - **Sensor**: open-drain hall-effect switch, one magnet on the wheel
//! - **Display**: HD44780 16x2 LCD (4-bit), or SSD1306 128x64 OLED (I2C)
//!   with the `display` feature
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments matching the SuperMini layout.
//!
//! # Interrupts
//!
//! The timer alarm and the sensor edge ISRs only set atomic flags. The main
//! loop drains them with [`take_event`] and feeds the result to
//! [`Speedometer::handle`](crate::Speedometer::handle), which keeps every
//! handler out of interrupt context and strictly one at a time.

mod sensor;
mod timebase;

pub use sensor::{take_edge_event, Esp32Sensor};
pub use timebase::{take_timer_event, Esp32TimeBase};

#[cfg(feature = "display")]
mod display;
#[cfg(feature = "display")]
pub use display::{DisplayError, Esp32Display};

use crate::speedo::Event;

/// Takes the next pending hardware event.
///
/// Timer events come first: an overflow that fired just before an edge
/// belongs to the window that edge closes.
pub fn take_event() -> Option<Event> {
    take_timer_event().or_else(take_edge_event)
}

/// Pin assignments for SuperMini ESP32-C3.
///
/// - HD44780 LCD on GPIO2-7
/// - Hall sensor on GPIO10
/// - I2C display on GPIO8, 9
pub mod pins {
    // =========================================================================
    // Character LCD (HD44780, 4-bit)
    // =========================================================================

    /// Register select
    pub const LCD_RS: i32 = 2;

    /// Enable strobe
    pub const LCD_EN: i32 = 3;

    /// Data bits D4..D7
    pub const LCD_DATA: [i32; 4] = [4, 5, 6, 7];

    // =========================================================================
    // Wheel Sensor
    // =========================================================================

    /// Hall sensor output (active low, falling edge on magnet arrival)
    pub const SENSOR: i32 = 10;

    // =========================================================================
    // Status LED
    // =========================================================================

    /// Onboard blue LED, toggled on every counter overflow (LCD build only)
    pub const STATUS_LED: i32 = 8;

    // =========================================================================
    // I2C Display (SSD1306)
    // =========================================================================

    /// I2C data line (also has onboard blue LED - will flicker during I2C)
    pub const I2C_SDA: i32 = 8;

    /// I2C clock line (also shared with BOOT button - only affects programming)
    pub const I2C_SCL: i32 = 9;

    /// Default I2C address for SSD1306 OLED
    pub const OLED_I2C_ADDR: u8 = 0x3C;
}
