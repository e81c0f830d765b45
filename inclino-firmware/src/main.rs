//! Inclino - Angle Gauge Serial Firmware
//!
//! Main firmware binary for RP2040-based tilt gauges. Runs an interactive
//! console on UART0 (GPIO0 TX, GPIO1 RX) through the interrupt-driven
//! serial core.
//!
//! No executor: the foreground is a plain loop that sleeps in `wfi` while
//! the UART interrupt moves characters.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_rp::bind_interrupts;
use embassy_rp::uart::Uart;
use embedded_io::Write;
use inclino_console::{Console, ConsoleError, Outcome};
use inclino_hal::UartConfig;
use {defmt_rtt as _, panic_probe as _};

mod commands;
mod pl011;
mod serial;

use crate::commands::{Gauge, COMMANDS};

/// Longest console input line
const LINE_LEN: usize = 64;

bind_interrupts!(struct Irqs {
    UART0_IRQ => serial::SerialInterruptHandler;
});

#[entry]
fn main() -> ! {
    info!("Inclino firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Driver sets up pins, baud rate and frame format; the serial core
    // takes over the data path from here
    let line = UartConfig::default();
    let _uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, serial::driver_config(&line));
    let port = serial::start(&line);

    let mut console = Console::<_, _, LINE_LEN>::new(port, COMMANDS);
    let mut gauge = Gauge::default();

    if console
        .io()
        .write_all(b"\r\nInclino angle gauge\r\nType 'help' for commands\r\n")
        .is_err()
    {
        warn!("Failed to write banner");
    }

    loop {
        match console.run_once(&mut gauge) {
            Ok(Outcome::Unknown) | Ok(Outcome::InvalidArguments) => {
                debug!("Rejected console input");
            }
            Ok(outcome) => debug!("Console: {}", outcome),
            Err(ConsoleError::Format) => warn!("Console output formatting failed"),
            Err(e) => error!("Console error: {}", Debug2Format(&e)),
        }
    }
}
