//! ESP32 general-purpose timer as the speedometer time base.
//!
//! The timer runs at 1 MHz (80 MHz APB / 80). Both running modes use the
//! alarm with auto-reload: the alarm value is the poll interval while
//! debouncing and the counter range while free-running, so the 64-bit
//! hardware counter behaves like a 16-bit one that wraps at the range.
//!
//! The alarm ISR only records which event fired; [`take_timer_event`] hands
//! it to the main loop.

use core::sync::atomic::{AtomicU8, Ordering};

use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;
use esp_idf_hal::timer::{config::Config as TimerConfig, Timer, TimerDriver};

use crate::config::TimingConfig;
use crate::speedo::Event;
use crate::traits::{TimeBase, TimerMode};

const NONE: u8 = 0;
const POLL: u8 = 1;
const OVERFLOW: u8 = 2;

/// Event the alarm raises in the current mode.
static ALARM_KIND: AtomicU8 = AtomicU8::new(NONE);
/// Event raised by the alarm and not yet taken.
static PENDING: AtomicU8 = AtomicU8::new(NONE);

/// APB clock divider for a 1 MHz tick.
const DIVIDER: u32 = 80;

/// Takes the pending timer event, if any.
pub fn take_timer_event() -> Option<Event> {
    match PENDING.swap(NONE, Ordering::AcqRel) {
        POLL => Some(Event::PollTick),
        OVERFLOW => Some(Event::CounterOverflow),
        _ => None,
    }
}

/// Hardware timer driving the measurement window and the debounce poll.
///
/// # Example
///
/// ```ignore
/// use rs_speedo::hal::esp32::Esp32TimeBase;
/// use rs_speedo::TimingConfig;
///
/// let peripherals = Peripherals::take()?;
/// let timer = Esp32TimeBase::new(peripherals.timer00, &TimingConfig::default())?;
/// ```
pub struct Esp32TimeBase<'d> {
    driver: TimerDriver<'d>,
    counter_range: u32,
}

impl<'d> Esp32TimeBase<'d> {
    /// Sets up the timer halted, with the alarm interrupt subscribed.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer cannot be configured.
    pub fn new<TIMER: Timer>(
        timer: impl Peripheral<P = TIMER> + 'd,
        timing: &TimingConfig,
    ) -> Result<Self, EspError> {
        let config = TimerConfig::new().divider(DIVIDER).auto_reload(true);
        let mut driver = TimerDriver::new(timer, &config)?;

        if driver.tick_hz() != timing.clock_hz as u64 {
            log::warn!(
                "timer ticks at {} Hz, timing assumes {} Hz",
                driver.tick_hz(),
                timing.clock_hz
            );
        }

        driver.enable(false)?;
        // Safe: the callback only touches atomics
        unsafe {
            driver.subscribe(|| {
                PENDING.store(ALARM_KIND.load(Ordering::Acquire), Ordering::Release);
            })?;
        }
        driver.enable_interrupt()?;

        Ok(Self {
            driver,
            counter_range: timing.counter_range.max(1),
        })
    }

    fn run_until(&mut self, alarm: u32, kind: u8) -> Result<(), EspError> {
        self.driver.enable(false)?;
        self.driver.set_counter(0)?;
        self.driver.set_alarm(alarm as u64)?;
        ALARM_KIND.store(kind, Ordering::Release);
        // Drop anything the previous mode raised
        PENDING.store(NONE, Ordering::Release);
        self.driver.enable_alarm(true)?;
        self.driver.enable(true)
    }
}

impl TimeBase for Esp32TimeBase<'_> {
    type Error = EspError;

    fn configure(&mut self, mode: TimerMode) -> Result<(), EspError> {
        match mode {
            TimerMode::Idle => {
                self.driver.enable(false)?;
                self.driver.enable_alarm(false)?;
                ALARM_KIND.store(NONE, Ordering::Release);
                Ok(())
            }
            TimerMode::PeriodicCompare(ticks) => self.run_until(ticks.max(1), POLL),
            TimerMode::FreeRunningOverflow => self.run_until(self.counter_range, OVERFLOW),
        }
    }

    fn counter(&self) -> u32 {
        match self.driver.counter() {
            Ok(ticks) => (ticks % self.counter_range as u64) as u32,
            Err(e) => {
                // Reads as an empty window; the reading it closes is too high
                log::warn!("timer counter read failed: {}", e);
                0
            }
        }
    }
}
