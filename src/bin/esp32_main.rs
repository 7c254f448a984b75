//! ESP32-C3 SuperMini wheel speedometer.
//!
//! This is the main entry point for the physical hardware. It wires the
//! timer, the hall sensor and the display to a [`Speedometer`], shows a
//! splash screen, then pumps interrupt events into the speedometer forever.
//! With the character LCD the on-board LED blinks on every counter overflow
//! as a heartbeat; the OLED build needs its pin for I2C.
//!
//! # Build
//!
//! ```bash
//! # HD44780 character LCD
//! cargo build --release --features esp32
//!
//! # SSD1306 OLED instead
//! cargo build --release --features esp32,display
//! ```

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use rs_speedo::hal::esp32::{take_event, Esp32Sensor, Esp32TimeBase};
use rs_speedo::traits::{EdgeDetector, SensorLine, SpeedDisplay, TimeBase};
use rs_speedo::{Config, Event, Speedometer, Transition};

/// Splash screen duration in milliseconds
const SPLASH_MS: u32 = 1_000;

/// Idle wait between event drains in milliseconds
const PUMP_INTERVAL_MS: u32 = 1;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    println!();
    println!("================================");
    println!("  rs-speedo SuperMini");
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = Config::default();
    println!(
        "Wheel: {} m diameter, {:.3} m circumference",
        config.wheel.diameter_m,
        config.wheel.circumference_m()
    );
    println!(
        "Timing: {} ms poll, stop after {:.0} ms",
        config.timing.poll_interval_ms(),
        config.timing.timeout_ms()
    );

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize Time Base (timer group 0, timer 0)
    // =========================================================================
    let timer = Esp32TimeBase::new(peripherals.timer00, &config.timing)?;
    println!("[OK] Timer initialized (1 MHz)");

    // =========================================================================
    // Initialize Sensor (hall switch on GPIO10)
    // =========================================================================
    let sensor = Esp32Sensor::new(peripherals.pins.gpio10)?;
    println!("[OK] Sensor initialized (GPIO10, falling edge)");

    // =========================================================================
    // Initialize Display
    // =========================================================================
    #[cfg(feature = "display")]
    let display = {
        use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
        use esp_idf_hal::prelude::*;
        use rs_speedo::hal::esp32::Esp32Display;

        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio8, // SDA
            peripherals.pins.gpio9, // SCL
            &I2cConfig::new().baudrate(400.kHz().into()),
        )?;
        println!("[OK] Display initialized (GPIO8/9 I2C)");
        Esp32Display::new(i2c)
    };

    #[cfg(not(feature = "display"))]
    let display = {
        use esp_idf_hal::delay::Ets;
        use esp_idf_hal::gpio::{OutputPin, PinDriver};
        use rs_speedo::hal::Hd44780;

        let lcd = Hd44780::new(
            PinDriver::output(peripherals.pins.gpio2.downgrade_output())?, // RS
            PinDriver::output(peripherals.pins.gpio3.downgrade_output())?, // EN
            [
                PinDriver::output(peripherals.pins.gpio4.downgrade_output())?,
                PinDriver::output(peripherals.pins.gpio5.downgrade_output())?,
                PinDriver::output(peripherals.pins.gpio6.downgrade_output())?,
                PinDriver::output(peripherals.pins.gpio7.downgrade_output())?,
            ],
            Ets,
        );
        println!("[OK] Display initialized (HD44780 on GPIO2-7)");
        lcd
    };

    // =========================================================================
    // Status LED (on-board, GPIO8)
    // =========================================================================
    #[cfg(feature = "display")]
    let heartbeat = || {};

    #[cfg(not(feature = "display"))]
    let heartbeat = {
        use esp_idf_hal::gpio::PinDriver;

        let mut led = PinDriver::output(peripherals.pins.gpio8)?;
        println!("[OK] Status LED initialized (GPIO8)");
        move || {
            if let Err(e) = led.toggle() {
                log::warn!("status LED toggle failed: {}", e);
            }
        }
    };

    run(timer, sensor, display, config, heartbeat)
}

/// Shows the splash screen, starts measuring and pumps events forever.
///
/// `heartbeat` runs on every counter overflow.
fn run<T, S, D, H>(
    timer: T,
    sensor: S,
    mut display: D,
    config: Config,
    mut heartbeat: H,
) -> anyhow::Result<()>
where
    T: TimeBase,
    T::Error: std::error::Error + Send + Sync + 'static,
    S: EdgeDetector + SensorLine,
    D: SpeedDisplay,
    H: FnMut(),
{
    // Splash is best effort; start() re-initializes the display anyway
    if let Err(e) = display
        .init()
        .and_then(|()| display.show_lines(" rs-speedo", concat!(" v", env!("CARGO_PKG_VERSION"))))
    {
        println!("[WARN] Splash failed: {:?}", e);
    }
    FreeRtos::delay_ms(SPLASH_MS);

    let mut speedo = Speedometer::new(timer, sensor, display, config);
    speedo.start()?;

    println!();
    println!("Measuring...");
    println!();

    // =========================================================================
    // Event Pump
    // =========================================================================
    loop {
        while let Some(event) = take_event() {
            if event == Event::CounterOverflow {
                heartbeat();
            }
            // A timer fault restarts the measurement; keep pumping
            match speedo.handle(event) {
                Ok(Transition::Rotation {
                    reading: Some(reading),
                    ..
                }) => println!("Speed: {} km/h", reading.kmh),
                Ok(Transition::TimedOut) => println!("Stopped"),
                Ok(_) => {}
                Err(e) => println!("[WARN] Timer fault: {}", e),
            }
        }

        FreeRtos::delay_ms(PUMP_INTERVAL_MS);
    }
}
