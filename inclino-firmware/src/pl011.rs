//! PL011 UART register adapter
//!
//! The RP2040 reports per-character errors in the upper bits of the data
//! register, so a character and its error flags only exist together once
//! DR has been read. [`Pl011::status`] reads DR ahead and latches both; the
//! dispatcher consumes the latch in the same service pass.

use embassy_rp::interrupt::{self, InterruptExt};
use embassy_rp::pac;
use inclino_hal::{LineErrors, LineStatus, TxInterruptControl, UartRegisters};

/// UART0 as seen by the interrupt dispatcher
#[derive(Debug, Default)]
pub struct Pl011 {
    latched: Option<(u8, LineErrors)>,
}

impl Pl011 {
    pub const fn uart0() -> Self {
        Self { latched: None }
    }

    fn regs(&self) -> pac::uart::Uart {
        pac::UART0
    }

    /// Unmask the receive and receive-timeout interrupts
    ///
    /// The transmit interrupt stays masked until there is something to send.
    pub fn listen(&mut self) {
        let regs = self.regs();
        regs.uartimsc().modify(|w| {
            w.set_rxim(true);
            w.set_rtim(true);
            w.set_txim(false);
        });
    }
}

impl UartRegisters for Pl011 {
    fn status(&mut self) -> LineStatus {
        let regs = self.regs();

        if self.latched.is_none() && !regs.uartfr().read().rxfe() {
            let dr = regs.uartdr().read();
            let errors = LineErrors {
                overrun: dr.oe(),
                // A break is a framing error with all-zero data
                framing: dr.fe() || dr.be(),
                parity: dr.pe(),
            };
            self.latched = Some((dr.data(), errors));
        }

        LineStatus {
            rx_ready: self.latched.is_some(),
            tx_ready: !regs.uartfr().read().txff(),
            errors: self
                .latched
                .map(|(_, errors)| errors)
                .unwrap_or(LineErrors::NONE),
        }
    }

    fn read_data(&mut self) -> u8 {
        self.latched.take().map(|(byte, _)| byte).unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        self.regs().uartdr().write(|w| w.set_data(byte));
    }

    fn clear_errors(&mut self, _errors: LineErrors) {
        // Any write to RSR clears all four flags
        self.regs().uartrsr().write(|w| {
            w.set_oe(true);
            w.set_be(true);
            w.set_pe(true);
            w.set_fe(true);
        });
        if let Some((_, errors)) = self.latched.as_mut() {
            *errors = LineErrors::NONE;
        }
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        self.regs().uartimsc().modify(|w| w.set_txim(enabled));
    }
}

impl TxInterruptControl for Pl011 {
    fn enable_tx_interrupt(&mut self) {
        self.regs().uartimsc().modify(|w| w.set_txim(true));
        // The TX interrupt fires on the FIFO crossing its trigger level. With
        // the FIFO already drained there is no crossing, so start the handler
        // by hand.
        interrupt::UART0_IRQ.pend();
    }
}
