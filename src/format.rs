//! Fixed-width display lines.
//!
//! Lines are built in stack buffers sized for a 16-column character display.
//! Text that does not fit is cut at the last whole character instead of
//! failing.

use core::fmt::{self, Write};

use crate::config::DisplayConfig;
use crate::estimator::SpeedReading;

/// Columns on one display line.
pub const LINE_WIDTH: usize = 16;

/// One display line.
pub type Line = heapless::String<LINE_WIDTH>;

/// `fmt::Write` adapter that silently drops whatever does not fit.
struct Truncating<'a>(&'a mut Line);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// First line: the caption, indented one column.
///
/// ```
/// use rs_speedo::config::DisplayConfig;
/// use rs_speedo::format::title_line;
///
/// assert_eq!(title_line(&DisplayConfig::default()).as_str(), " Speed");
/// ```
pub fn title_line(config: &DisplayConfig) -> Line {
    let mut line = Line::new();
    let _ = write!(Truncating(&mut line), " {}", config.title);
    line
}

/// Second line: the reading and its unit, indented one column.
///
/// ```
/// use rs_speedo::config::DisplayConfig;
/// use rs_speedo::estimator::SpeedReading;
/// use rs_speedo::format::speed_line;
///
/// let line = speed_line(SpeedReading::new(32), &DisplayConfig::default());
/// assert_eq!(line.as_str(), " 32 kmph");
/// ```
pub fn speed_line(reading: SpeedReading, config: &DisplayConfig) -> Line {
    let mut line = Line::new();
    let _ = write!(Truncating(&mut line), " {} {}", reading.kmh, config.unit);
    line
}
