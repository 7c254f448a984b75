//! Display abstraction for speed output.
//!
//! This module defines the [`SpeedDisplay`] trait, a two-line text sink.
//! The measurement core hands it already formatted lines; how they reach
//! the glass (HD44780 nibbles, SSD1306 frame buffer, a test log) is the
//! implementor's business.

/// Two-line text display.
///
/// # Example
///
/// ```ignore
/// use rs_speedo::traits::SpeedDisplay;
///
/// struct MyDisplay { /* ... */ }
///
/// impl SpeedDisplay for MyDisplay {
///     type Error = ();
///
///     fn init(&mut self) -> Result<(), ()> { Ok(()) }
///     fn clear(&mut self) -> Result<(), ()> { Ok(()) }
///     fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), ()> {
///         // Write both lines...
///         Ok(())
///     }
/// }
/// ```
pub trait SpeedDisplay {
    /// Error type for display operations.
    type Error: core::fmt::Debug;

    /// Initializes the display hardware.
    ///
    /// Called once at startup.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Clears the display.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Replaces the screen content with two lines of text.
    ///
    /// Must not block for longer than one screen write.
    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error>;
}
