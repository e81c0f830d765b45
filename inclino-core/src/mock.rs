//! Simulated UART for unit tests
//!
//! Clones share one register file, so a test can hand one clone to the
//! port as its transmit-enable control, drive the dispatcher with another,
//! and inspect the wire with a third.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use inclino_hal::{LineErrors, LineStatus, TxInterruptControl, UartRegisters};

#[derive(Debug)]
struct Registers {
    rx_fifo: VecDeque<(u8, LineErrors)>,
    pending_errors: LineErrors,
    sent: Vec<u8>,
    tx_ready: bool,
    tx_interrupt: bool,
    tx_enables: u32,
    errors_cleared: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct MockUart {
    regs: Rc<RefCell<Registers>>,
}

impl MockUart {
    pub(crate) fn new() -> Self {
        Self {
            regs: Rc::new(RefCell::new(Registers {
                rx_fifo: VecDeque::new(),
                pending_errors: LineErrors::NONE,
                sent: Vec::new(),
                tx_ready: true,
                tx_interrupt: false,
                tx_enables: 0,
                errors_cleared: 0,
            })),
        }
    }

    /// A character arrives on the wire
    pub(crate) fn receive(&self, byte: u8) {
        self.receive_with_errors(byte, LineErrors::NONE);
    }

    pub(crate) fn receive_with_errors(&self, byte: u8, errors: LineErrors) {
        self.regs.borrow_mut().rx_fifo.push_back((byte, errors));
    }

    /// Error flags not tied to a readable character
    pub(crate) fn raise_errors(&self, errors: LineErrors) {
        self.regs.borrow_mut().pending_errors = errors;
    }

    pub(crate) fn set_tx_ready(&self, ready: bool) {
        self.regs.borrow_mut().tx_ready = ready;
    }

    pub(crate) fn sent(&self) -> Vec<u8> {
        self.regs.borrow().sent.clone()
    }

    pub(crate) fn tx_interrupt_enabled(&self) -> bool {
        self.regs.borrow().tx_interrupt
    }

    /// Number of times the foreground switched the transmit interrupt on
    pub(crate) fn tx_enables(&self) -> u32 {
        self.regs.borrow().tx_enables
    }

    pub(crate) fn errors_cleared(&self) -> u32 {
        self.regs.borrow().errors_cleared
    }
}

impl UartRegisters for MockUart {
    fn status(&mut self) -> LineStatus {
        let regs = self.regs.borrow();
        let head_errors = regs
            .rx_fifo
            .front()
            .map(|(_, errors)| *errors)
            .unwrap_or(LineErrors::NONE);

        LineStatus {
            rx_ready: !regs.rx_fifo.is_empty(),
            tx_ready: regs.tx_ready,
            errors: LineErrors {
                overrun: head_errors.overrun || regs.pending_errors.overrun,
                framing: head_errors.framing || regs.pending_errors.framing,
                parity: head_errors.parity || regs.pending_errors.parity,
            },
        }
    }

    fn read_data(&mut self) -> u8 {
        self.regs
            .borrow_mut()
            .rx_fifo
            .pop_front()
            .map(|(byte, _)| byte)
            .unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        self.regs.borrow_mut().sent.push(byte);
    }

    fn clear_errors(&mut self, _errors: LineErrors) {
        let mut regs = self.regs.borrow_mut();
        regs.pending_errors = LineErrors::NONE;
        if let Some((_, errors)) = regs.rx_fifo.front_mut() {
            *errors = LineErrors::NONE;
        }
        regs.errors_cleared += 1;
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        self.regs.borrow_mut().tx_interrupt = enabled;
    }
}

impl TxInterruptControl for MockUart {
    fn enable_tx_interrupt(&mut self) {
        let mut regs = self.regs.borrow_mut();
        regs.tx_interrupt = true;
        regs.tx_enables += 1;
    }
}
