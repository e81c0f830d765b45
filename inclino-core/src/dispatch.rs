//! Interrupt-side half of the serial channel
//!
//! The dispatcher runs inside the UART interrupt handler. One call to
//! [`InterruptDispatcher::service`] looks at the status register once and
//! handles whatever it reports:
//!
//! - line errors (overrun, framing, parity) are cleared and the character
//!   they belong to is thrown away
//! - a received character is masked and pushed into the receive buffer, or
//!   dropped if the buffer is full
//! - when the transmit register is free and draining is enabled, the next
//!   byte goes out; an empty transmit buffer switches draining off
//!
//! The handler never waits. Losing a byte when the receive buffer is full is
//! preferable to stalling the interrupt.
//!
//! # Transmit enable
//!
//! ```text
//!        write() submits ≥1 byte
//!   OFF ─────────────────────────▶ ON
//!    ▲                             │
//!    └─────────────────────────────┘
//!        tx buffer drains to empty
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use inclino_hal::{LineErrors, UartRegisters};

use crate::ring::{Consumer, Producer};

/// Snapshot of the receive-side loss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DropCounters {
    /// Characters dropped because the receive buffer was full
    pub rx_overflow: u32,
    /// Receiver overrun events
    pub overrun: u32,
    /// Framing errors
    pub framing: u32,
    /// Parity errors
    pub parity: u32,
}

impl DropCounters {
    /// Total number of loss events
    pub fn total(&self) -> u32 {
        self.rx_overflow
            .saturating_add(self.overrun)
            .saturating_add(self.framing)
            .saturating_add(self.parity)
    }
}

/// Loss counters shared between the dispatcher and the port
///
/// Only the interrupt context increments; the foreground reads and resets.
/// Increments use a plain load and store so they work on cores without
/// atomic read-modify-write instructions.
#[derive(Debug, Default)]
pub(crate) struct DropStats {
    rx_overflow: AtomicU32,
    overrun: AtomicU32,
    framing: AtomicU32,
    parity: AtomicU32,
}

impl DropStats {
    pub(crate) const fn new() -> Self {
        Self {
            rx_overflow: AtomicU32::new(0),
            overrun: AtomicU32::new(0),
            framing: AtomicU32::new(0),
            parity: AtomicU32::new(0),
        }
    }

    fn bump(counter: &AtomicU32) {
        let value = counter.load(Ordering::Relaxed);
        counter.store(value.saturating_add(1), Ordering::Relaxed);
    }

    fn record_overflow(&self) {
        Self::bump(&self.rx_overflow);
    }

    fn record_line_errors(&self, errors: LineErrors) {
        if errors.overrun {
            Self::bump(&self.overrun);
        }
        if errors.framing {
            Self::bump(&self.framing);
        }
        if errors.parity {
            Self::bump(&self.parity);
        }
    }

    pub(crate) fn snapshot(&self) -> DropCounters {
        DropCounters {
            rx_overflow: self.rx_overflow.load(Ordering::Relaxed),
            overrun: self.overrun.load(Ordering::Relaxed),
            framing: self.framing.load(Ordering::Relaxed),
            parity: self.parity.load(Ordering::Relaxed),
        }
    }

    /// Must not race with the interrupt side; callers hold a critical section
    pub(crate) fn clear(&self) {
        self.rx_overflow.store(0, Ordering::Relaxed);
        self.overrun.store(0, Ordering::Relaxed);
        self.framing.store(0, Ordering::Relaxed);
        self.parity.store(0, Ordering::Relaxed);
    }
}

/// What a single [`InterruptDispatcher::service`] pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Serviced {
    /// A character was taken out of the receive register
    pub received: bool,
    /// A character was written to the transmit register
    pub transmitted: bool,
    /// Line error flags were cleared
    pub errors: bool,
}

impl Serviced {
    /// Check if the pass made any progress
    ///
    /// FIFO-backed UARTs keep calling `service` until this is `false`.
    pub fn any(&self) -> bool {
        self.received || self.transmitted || self.errors
    }
}

/// Repeat `pass` until it reports no progress, at most `max_passes` times
///
/// `pass` runs one [`InterruptDispatcher::service`] call and returns
/// [`Serviced::any`]. Handlers that share the dispatcher through a lock take
/// the lock inside `pass`, so interrupts stay masked for a single pass at a
/// time. Returns the number of passes that made progress.
pub fn service_until_idle<F: FnMut() -> bool>(max_passes: usize, mut pass: F) -> usize {
    let mut progressed = 0;
    while progressed < max_passes && pass() {
        progressed += 1;
    }
    progressed
}

/// Interrupt handler state for one serial channel
///
/// Holds the consuming end of the transmit buffer and the producing end of
/// the receive buffer. Created by [`SerialChannel::split`](crate::SerialChannel::split).
pub struct InterruptDispatcher<'a, const TX: usize, const RX: usize> {
    tx: Consumer<'a, TX>,
    rx: Producer<'a, RX>,
    tx_enabled: &'a AtomicBool,
    drops: &'a DropStats,
    rx_mask: u8,
}

impl<'a, const TX: usize, const RX: usize> InterruptDispatcher<'a, TX, RX> {
    pub(crate) fn new(
        tx: Consumer<'a, TX>,
        rx: Producer<'a, RX>,
        tx_enabled: &'a AtomicBool,
        drops: &'a DropStats,
        rx_mask: u8,
    ) -> Self {
        Self {
            tx,
            rx,
            tx_enabled,
            drops,
            rx_mask,
        }
    }

    /// Handle one interrupt event
    ///
    /// Reads the status register once and services the receive, error and
    /// transmit conditions it reports. Runs in O(1) time.
    pub fn service<R: UartRegisters>(&mut self, regs: &mut R) -> Serviced {
        let status = regs.status();
        let mut serviced = Serviced::default();

        if status.errors.any() {
            regs.clear_errors(LineErrors::ALL);
            self.drops.record_line_errors(status.errors);
            if status.rx_ready {
                // The character that carried the error is discarded
                let _ = regs.read_data();
            }
            serviced.errors = true;
        } else if status.rx_ready {
            let byte = regs.read_data() & self.rx_mask;
            if !self.rx.enqueue_byte(byte) {
                self.drops.record_overflow();
            }
            serviced.received = true;
        }

        if status.tx_ready && self.tx_enabled.load(Ordering::Acquire) {
            match self.tx.dequeue_byte() {
                Some(byte) => {
                    regs.write_data(byte);
                    serviced.transmitted = true;
                }
                None => self.stop_draining(regs),
            }
        }

        serviced
    }

    /// Switch transmit draining off once the buffer is empty
    ///
    /// Paired with the port's enable under the same critical section, so the
    /// mirror flag and the hardware bit never disagree.
    fn stop_draining<R: UartRegisters>(&mut self, regs: &mut R) {
        critical_section::with(|_| {
            if self.tx.is_empty() {
                self.tx_enabled.store(false, Ordering::Release);
                regs.set_tx_interrupt(false);
            }
        });
    }

    /// Current state of the transmit-enable mirror
    pub fn tx_enabled(&self) -> bool {
        self.tx_enabled.load(Ordering::Acquire)
    }

    /// Bytes waiting to be transmitted
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    /// Bytes received and not yet read by the foreground
    pub fn rx_available(&self) -> usize {
        self.rx.len()
    }
}
