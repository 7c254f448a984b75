//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `hd44780`: 16x2 character LCD in 4-bit mode over embedded-hal pins
//!   (requires `lcd` feature)
//! - `esp32`: ESP32 timer, hall sensor and OLED (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "lcd")]
pub mod hd44780;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "lcd")]
pub use hd44780::Hd44780;

#[cfg(feature = "esp32")]
pub use esp32::*;
