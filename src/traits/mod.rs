//! Trait definitions for hardware abstraction.
//!
//! This module defines the seams that let rs-speedo:
//! - Run on different hardware (ESP32, any `embedded-hal` board, desktop mock)
//! - Drive different displays (HD44780 character LCD, SSD1306 OLED)
//!
//! # Submodules
//!
//! - `hardware`: Time base, edge detector and sensor line
//! - `display`: Two-line display trait
//!
//! # Hardware Abstraction
//!
//! - [`TimeBase`]: Counter with periodic-compare and free-running modes
//! - [`EdgeDetector`]: Suppressible falling-edge notification
//! - [`SensorLine`]: Level read used while debouncing
//! - [`SpeedDisplay`]: Two lines of text

pub mod display;
pub mod hardware;

pub use display::*;
pub use hardware::*;
