//! Inclino Hardware Abstraction Layer
//!
//! This crate defines the register-level contract between the serial core
//! and a chip-specific UART. The interrupt dispatcher and the foreground
//! port in `inclino-core` only ever touch hardware through these traits, so
//! the same core runs against a real PL011 in the firmware and against a
//! simulated UART in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Console / Application                  │
//! └─────────────────────────────────────────┘
//!                     │  write / read_byte
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  inclino-core (ring buffers, dispatch)  │
//! └─────────────────────────────────────────┘
//!                     │  UartRegisters
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  inclino-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ PL011 adapter │
//!             │  (firmware)   │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartRegisters`] - Data, status and interrupt-enable registers
//! - [`uart::TxInterruptControl`] - Foreground capability to start transmit draining

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

// Re-export key items at crate root for convenience
pub use uart::{
    ConfigError, DataBits, LineErrors, LineStatus, Parity, StopBits, TxInterruptControl,
    UartConfig, UartRegisters,
};
