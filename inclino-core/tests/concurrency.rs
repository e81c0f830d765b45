//! Cross-thread tests
//!
//! Host threads stand in for the foreground and the interrupt handler. The
//! `critical-section` std implementation makes the count updates atomic
//! across them, the same guarantee interrupt masking gives on the target.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use inclino_core::{CircularByteBuffer, SerialChannel, Wait};
use inclino_hal::{LineErrors, LineStatus, TxInterruptControl, UartRegisters};

/// Yield the thread while waiting so the "interrupt" thread gets to run
struct YieldNow;

impl Wait for YieldNow {
    fn wait_until<F: FnMut() -> bool>(&mut self, mut ready: F) {
        while !ready() {
            thread::yield_now();
        }
    }
}

#[derive(Default)]
struct Wire {
    /// Bytes in flight from TX back to RX
    loopback: VecDeque<u8>,
    tx_interrupt: bool,
    tx_enables: u32,
    transmitted: usize,
}

/// UART with TX wired straight back into RX
#[derive(Clone, Default)]
struct LoopbackUart {
    wire: Arc<Mutex<Wire>>,
}

impl UartRegisters for LoopbackUart {
    fn status(&mut self) -> LineStatus {
        let wire = self.wire.lock().unwrap();
        LineStatus {
            rx_ready: !wire.loopback.is_empty(),
            tx_ready: true,
            errors: LineErrors::NONE,
        }
    }

    fn read_data(&mut self) -> u8 {
        self.wire.lock().unwrap().loopback.pop_front().unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        let mut wire = self.wire.lock().unwrap();
        wire.loopback.push_back(byte);
        wire.transmitted += 1;
    }

    fn clear_errors(&mut self, _errors: LineErrors) {}

    fn set_tx_interrupt(&mut self, enabled: bool) {
        self.wire.lock().unwrap().tx_interrupt = enabled;
    }
}

impl TxInterruptControl for LoopbackUart {
    fn enable_tx_interrupt(&mut self) {
        let mut wire = self.wire.lock().unwrap();
        wire.tx_interrupt = true;
        wire.tx_enables += 1;
    }
}

#[test]
fn ring_survives_concurrent_producer_and_consumer() {
    const ROUNDS: usize = 400;
    const TOTAL: usize = 256 * ROUNDS;

    let mut buffer = CircularByteBuffer::<64>::new();
    let (mut producer, mut consumer) = buffer.split();

    thread::scope(|s| {
        s.spawn(move || {
            let mut next = 0usize;
            let mut chunk = [0u8; 13];
            while next < TOTAL {
                let len = chunk.len().min(TOTAL - next);
                for (i, slot) in chunk[..len].iter_mut().enumerate() {
                    *slot = (next + i) as u8;
                }
                let accepted = producer.enqueue(&chunk[..len]);
                assert!(producer.len() <= 64);
                next += accepted;
                if accepted == 0 {
                    thread::yield_now();
                }
            }
        });

        s.spawn(move || {
            let mut expected = 0usize;
            let mut out = [0u8; 7];
            while expected < TOTAL {
                let len = consumer.len();
                assert!(len <= 64, "length escaped capacity: {len}");

                let removed = consumer.dequeue(&mut out);
                for &byte in &out[..removed] {
                    assert_eq!(byte, expected as u8, "byte {expected} out of order");
                    expected += 1;
                }
                if removed == 0 {
                    thread::yield_now();
                }
            }
            assert_eq!(consumer.dequeue(&mut out), 0);
        });
    });

    assert!(buffer.is_empty());
}

#[test]
fn channel_loopback_preserves_order() {
    const TOTAL: usize = 4096;
    const CHUNK: usize = 24;

    let mut channel = SerialChannel::<16, 32>::default();
    let uart = LoopbackUart::default();
    let (port, mut dispatcher) = channel.split(uart.clone());
    let mut port = port.with_wait(YieldNow);
    let stop = AtomicBool::new(false);

    thread::scope(|s| {
        let mut isr_uart = uart.clone();
        let stop = &stop;
        s.spawn(move || {
            while !stop.load(Ordering::Acquire) {
                if !dispatcher.service(&mut isr_uart).any() {
                    thread::yield_now();
                }
            }
        });

        // 7-bit pattern so the ASCII receive mask is a no-op
        let pattern: Vec<u8> = (0..TOTAL).map(|i| (i % 128) as u8).collect();
        let mut received = Vec::with_capacity(TOTAL);

        for chunk in pattern.chunks(CHUNK) {
            port.write(chunk);
            for _ in 0..chunk.len() {
                received.push(port.read_byte());
            }
        }

        port.flush();
        stop.store(true, Ordering::Release);

        assert_eq!(received, pattern);
        assert_eq!(port.drops().total(), 0);
        assert!(!port.tx_enabled());
    });

    let wire = uart.wire.lock().unwrap();
    assert_eq!(wire.transmitted, TOTAL);
    assert!(!wire.tx_interrupt);
    assert!(wire.tx_enables >= 1);
}
