//! Blocking serial channel
//!
//! A [`SerialChannel`] owns the transmit and receive buffers, the mirror of
//! the transmit-interrupt-enable bit and the loss counters. Splitting it
//! yields the two halves that run in different contexts:
//!
//! - [`SerialPort`] for the foreground: blocking `write` and `read_byte`
//! - [`InterruptDispatcher`] for the UART interrupt handler
//!
//! Both halves borrow the channel, so it has to outlive them; firmware keeps
//! it in a `StaticCell` to get `'static` halves.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use inclino_hal::TxInterruptControl;

use crate::config::ChannelConfig;
use crate::dispatch::{DropCounters, DropStats, InterruptDispatcher};
use crate::error::SerialError;
use crate::ring::{CircularByteBuffer, Consumer, Producer};
use crate::wait::{Spin, Wait};

/// Transmit and receive buffers shared by a port and its interrupt handler
pub struct SerialChannel<const TX: usize, const RX: usize> {
    tx: CircularByteBuffer<TX>,
    rx: CircularByteBuffer<RX>,
    /// Mirrors the hardware transmit-interrupt-enable bit
    tx_enabled: AtomicBool,
    drops: DropStats,
    config: ChannelConfig,
}

impl<const TX: usize, const RX: usize> Default for SerialChannel<TX, RX> {
    fn default() -> Self {
        Self::new(ChannelConfig::ascii())
    }
}

impl<const TX: usize, const RX: usize> SerialChannel<TX, RX> {
    /// Create a channel with empty buffers and draining switched off
    pub const fn new(config: ChannelConfig) -> Self {
        Self {
            tx: CircularByteBuffer::new(),
            rx: CircularByteBuffer::new(),
            tx_enabled: AtomicBool::new(false),
            drops: DropStats::new(),
            config,
        }
    }

    /// Reset both buffers, the enable mirror and the loss counters
    pub fn init(&mut self) {
        self.tx.init();
        self.rx.init();
        *self.tx_enabled.get_mut() = false;
        self.drops.clear();
    }

    /// Channel configuration
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Current state of the transmit-enable mirror
    pub fn tx_enabled(&self) -> bool {
        self.tx_enabled.load(Ordering::Acquire)
    }

    /// Split into the foreground port and the interrupt dispatcher
    ///
    /// `control` is how the port switches the hardware transmit interrupt
    /// on. The port starts out spinning while it waits; use
    /// [`SerialPort::with_wait`] to pick another strategy.
    pub fn split<C: TxInterruptControl>(
        &mut self,
        control: C,
    ) -> (SerialPort<'_, TX, RX, C>, InterruptDispatcher<'_, TX, RX>) {
        let rx_mask = self.config.rx_data_mask;
        let (tx_producer, tx_consumer) = self.tx.split();
        let (rx_producer, rx_consumer) = self.rx.split();

        let port = SerialPort {
            tx: tx_producer,
            rx: rx_consumer,
            tx_enabled: &self.tx_enabled,
            drops: &self.drops,
            control,
            wait: Spin,
        };
        let dispatcher = InterruptDispatcher::new(
            tx_consumer,
            rx_producer,
            &self.tx_enabled,
            &self.drops,
            rx_mask,
        );

        (port, dispatcher)
    }
}

/// Foreground half of a [`SerialChannel`]
///
/// Every call here blocks until the interrupt side has made enough
/// progress. There is no timeout; a UART that stops interrupting stalls
/// the caller forever.
pub struct SerialPort<'a, const TX: usize, const RX: usize, C, W = Spin> {
    tx: Producer<'a, TX>,
    rx: Consumer<'a, RX>,
    tx_enabled: &'a AtomicBool,
    drops: &'a DropStats,
    control: C,
    wait: W,
}

impl<'a, const TX: usize, const RX: usize, C, W> SerialPort<'a, TX, RX, C, W>
where
    C: TxInterruptControl,
    W: Wait,
{
    /// Replace the wait strategy
    pub fn with_wait<W2: Wait>(self, wait: W2) -> SerialPort<'a, TX, RX, C, W2> {
        SerialPort {
            tx: self.tx,
            rx: self.rx,
            tx_enabled: self.tx_enabled,
            drops: self.drops,
            control: self.control,
            wait,
        }
    }

    /// Queue every byte for transmission
    ///
    /// Waits for space whenever the transmit buffer is full, then makes sure
    /// draining is switched on. Returns once the last byte is buffered, not
    /// once it is on the wire.
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            while !self.tx.enqueue_byte(byte) {
                // Full: the interrupt side must be draining or we wait forever
                self.start_transmit();
                let tx = &self.tx;
                self.wait.wait_until(|| !tx.is_full());
            }
        }

        if !bytes.is_empty() {
            self.start_transmit();
        }
    }

    /// Write bytes up to the first NUL, C-string style
    ///
    /// `None` is rejected immediately without touching the buffer. Returns
    /// the number of bytes queued.
    pub fn write_terminated(&mut self, bytes: Option<&[u8]>) -> Result<usize, SerialError> {
        let bytes = bytes.ok_or(SerialError::InvalidArgument)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.write(&bytes[..end]);
        Ok(end)
    }

    /// Block until a byte has been received, then return it
    pub fn read_byte(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.rx.dequeue_byte() {
                return byte;
            }
            let rx = &self.rx;
            self.wait.wait_until(|| !rx.is_empty());
        }
    }

    /// Return a received byte if one is waiting
    pub fn try_read_byte(&mut self) -> Option<u8> {
        self.rx.dequeue_byte()
    }

    /// Block until at least one byte is available, then read as many as fit
    ///
    /// Returns 0 only for an empty `buf`.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        let rx = &self.rx;
        self.wait.wait_until(|| !rx.is_empty());
        self.rx.dequeue(buf)
    }

    /// Block until every queued byte has been handed to the hardware and
    /// draining has switched itself off
    pub fn flush(&mut self) {
        let tx = &self.tx;
        let tx_enabled = self.tx_enabled;
        self.wait
            .wait_until(|| tx.is_empty() && !tx_enabled.load(Ordering::Acquire));
    }

    /// Set the enable mirror and the hardware bit together
    ///
    /// Only the OFF to ON edge touches the hardware, so repeated writes
    /// while draining have no extra side effects.
    fn start_transmit(&mut self) {
        let tx_enabled = self.tx_enabled;
        let control = &mut self.control;
        critical_section::with(|_| {
            if !tx_enabled.load(Ordering::Acquire) {
                tx_enabled.store(true, Ordering::Release);
                control.enable_tx_interrupt();
            }
        });
    }

    /// Current state of the transmit-enable mirror
    pub fn tx_enabled(&self) -> bool {
        self.tx_enabled.load(Ordering::Acquire)
    }

    /// Bytes queued and not yet handed to the hardware
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    /// Bytes received and waiting to be read
    pub fn rx_available(&self) -> usize {
        self.rx.len()
    }

    /// Receive-side loss counters
    pub fn drops(&self) -> DropCounters {
        self.drops.snapshot()
    }

    /// Zero the loss counters
    pub fn reset_drops(&mut self) {
        critical_section::with(|_| self.drops.clear());
    }
}

impl<const TX: usize, const RX: usize, C, W> embedded_io::ErrorType for SerialPort<'_, TX, RX, C, W> {
    type Error = core::convert::Infallible;
}

impl<const TX: usize, const RX: usize, C, W> embedded_io::Read for SerialPort<'_, TX, RX, C, W>
where
    C: TxInterruptControl,
    W: Wait,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(SerialPort::read(self, buf))
    }
}

impl<const TX: usize, const RX: usize, C, W> embedded_io::ReadReady for SerialPort<'_, TX, RX, C, W>
where
    C: TxInterruptControl,
    W: Wait,
{
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl<const TX: usize, const RX: usize, C, W> embedded_io::Write for SerialPort<'_, TX, RX, C, W>
where
    C: TxInterruptControl,
    W: Wait,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        SerialPort::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        SerialPort::flush(self);
        Ok(())
    }
}

impl<const TX: usize, const RX: usize, C, W> embedded_io::WriteReady for SerialPort<'_, TX, RX, C, W>
where
    C: TxInterruptControl,
    W: Wait,
{
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.tx.is_full())
    }
}

impl<const TX: usize, const RX: usize, C, W> fmt::Write for SerialPort<'_, TX, RX, C, W>
where
    C: TxInterruptControl,
    W: Wait,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}
