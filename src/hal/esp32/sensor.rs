//! Hall-effect wheel sensor on a GPIO with a falling-edge interrupt.
//!
//! The sensor output is open-drain and pulled low while the magnet is over
//! it, so "active" means the line reads low.
//!
//! # Wiring
//!
//! - OUT → GPIO10
//! - VCC → 3.3V
//! - GND → GND

use core::sync::atomic::{AtomicBool, Ordering};

use esp_idf_hal::gpio::{Input, InputPin, InterruptType, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::speedo::Event;
use crate::traits::{EdgeDetector, SensorLine};

/// Set by the GPIO ISR on a falling edge.
static EDGE: AtomicBool = AtomicBool::new(false);

/// Takes the pending edge, if any.
pub fn take_edge_event() -> Option<Event> {
    EDGE.swap(false, Ordering::AcqRel).then_some(Event::SensorEdge)
}

/// Wheel sensor input.
///
/// ESP-IDF disables a GPIO interrupt after it fires; [`EdgeDetector::enable`]
/// re-enables it, which the speedometer does each time it re-arms.
pub struct Esp32Sensor<'d, P>
where
    P: InputPin + OutputPin,
{
    pin: PinDriver<'d, P, Input>,
    enabled: bool,
}

impl<'d, P> Esp32Sensor<'d, P>
where
    P: InputPin + OutputPin,
{
    /// Configures the pin with pull-up and subscribes the edge interrupt.
    /// Edges stay masked until [`EdgeDetector::enable`].
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_interrupt_type(InterruptType::NegEdge)?;
        // Safe: the callback only touches an atomic
        unsafe {
            pin.subscribe(|| EDGE.store(true, Ordering::Release))?;
        }
        pin.disable_interrupt()?;

        Ok(Self {
            pin,
            enabled: false,
        })
    }
}

impl<P> EdgeDetector for Esp32Sensor<'_, P>
where
    P: InputPin + OutputPin,
{
    fn enable(&mut self) {
        // An edge latched while masked is stale
        EDGE.store(false, Ordering::Release);
        match self.pin.enable_interrupt() {
            Ok(()) => self.enabled = true,
            Err(e) => log::warn!("sensor interrupt enable failed: {}", e),
        }
    }

    fn disable(&mut self) {
        if let Err(e) = self.pin.disable_interrupt() {
            log::warn!("sensor interrupt disable failed: {}", e);
        }
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl<P> SensorLine for Esp32Sensor<'_, P>
where
    P: InputPin + OutputPin,
{
    fn is_active(&self) -> bool {
        self.pin.is_low()
    }
}
