//! Interrupt-driven console UART
//!
//! Owns the static serial channel, publishes its dispatcher to the UART0
//! interrupt and hands the blocking port to the foreground.

use core::cell::RefCell;

use critical_section::Mutex;
use defmt::*;
use embassy_rp::interrupt::typelevel::{self, Handler};
use embassy_rp::interrupt::{self, InterruptExt};
use embassy_rp::{clocks, uart};
use static_cell::StaticCell;

use inclino_core::{service_until_idle, InterruptDispatcher, SerialChannel, SerialPort, Wait};
use inclino_hal::{DataBits, Parity, StopBits, UartConfig};

use crate::pl011::Pl011;

/// Transmit buffer size (power of two)
pub const TX_SIZE: usize = 256;

/// Receive buffer size (power of two)
pub const RX_SIZE: usize = 64;

/// Upper bound on service passes per interrupt
const MAX_PASSES: usize = 64;

/// PL011 receiver oversampling ratio
const OVERSAMPLE: u32 = 16;

/// Foreground handle to the console UART
pub type Port = SerialPort<'static, TX_SIZE, RX_SIZE, Pl011, SleepUntilInterrupt>;

struct IsrState {
    dispatcher: InterruptDispatcher<'static, TX_SIZE, RX_SIZE>,
    uart: Pl011,
}

static CHANNEL: StaticCell<SerialChannel<TX_SIZE, RX_SIZE>> = StaticCell::new();

static ISR_STATE: Mutex<RefCell<Option<IsrState>>> = Mutex::new(RefCell::new(None));

/// UART0 interrupt handler
pub struct SerialInterruptHandler;

impl Handler<typelevel::UART0_IRQ> for SerialInterruptHandler {
    unsafe fn on_interrupt() {
        // One critical section per pass keeps other interrupts serviceable
        service_until_idle(MAX_PASSES, || {
            critical_section::with(|cs| {
                ISR_STATE
                    .borrow_ref_mut(cs)
                    .as_mut()
                    .map(|state| state.dispatcher.service(&mut state.uart).any())
                    .unwrap_or(false)
            })
        });
    }
}

/// Sleep with `wfi` until the condition holds
///
/// The check and the sleep run with interrupts masked, so an interrupt
/// that makes the condition true in between still wakes the core.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepUntilInterrupt;

impl Wait for SleepUntilInterrupt {
    fn wait_until<F: FnMut() -> bool>(&mut self, mut ready: F) {
        loop {
            let done = cortex_m::interrupt::free(|_| {
                if ready() {
                    return true;
                }
                cortex_m::asm::wfi();
                false
            });
            if done {
                return;
            }
        }
    }
}

/// Driver configuration matching the line settings
pub fn driver_config(line: &UartConfig) -> uart::Config {
    let mut config = uart::Config::default();
    config.baudrate = line.baudrate;
    config.data_bits = match line.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
        DataBits::Nine => {
            warn!("PL011 has no 9-bit mode, using 8 data bits");
            uart::DataBits::DataBits8
        }
    };
    config.parity = match line.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    config.stop_bits = match line.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    config
}

/// Start interrupt-driven I/O on UART0
///
/// UART0 must already be configured by the driver. Call once.
pub fn start(line: &UartConfig) -> Port {
    // 7-bit receive mask, as the console protocol expects
    let channel = CHANNEL.init(SerialChannel::default());
    let (port, dispatcher) = channel.split(Pl011::uart0());

    let mut uart = Pl011::uart0();
    uart.listen();

    critical_section::with(|cs| {
        ISR_STATE
            .borrow_ref_mut(cs)
            .replace(IsrState { dispatcher, uart });
    });

    interrupt::UART0_IRQ.unpend();
    // SAFETY: the handler only touches state published above
    unsafe { interrupt::UART0_IRQ.enable() };

    match line.divisor(clocks::clk_peri_freq(), OVERSAMPLE) {
        Ok(divisor) => info!(
            "Console UART running: {} baud (divisor {}), {} bits per frame, tx {} rx {}",
            line.baudrate,
            divisor,
            line.frame_bits(),
            TX_SIZE,
            RX_SIZE
        ),
        Err(e) => warn!("Baud rate {} out of range: {}", line.baudrate, e),
    }

    port.with_wait(SleepUntilInterrupt)
}
