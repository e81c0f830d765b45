//! Interrupt-driven serial core for the angle gauge firmware
//!
//! This crate decouples a blocking, character-oriented serial API from an
//! interrupt-driven UART:
//!
//! - [`CircularByteBuffer`] - power-of-two SPSC ring with an interrupt-safe count
//! - [`SerialChannel`] - transmit and receive rings plus the transmit-enable flag
//! - [`SerialPort`] - blocking `write` / `read_byte` for the foreground
//! - [`InterruptDispatcher`] - drains and fills the rings from the UART interrupt
//!
//! Nothing here knows about a particular chip; hardware is reached through
//! the traits in `inclino-hal`.

#![cfg_attr(not(test), no_std)]
#![warn(unsafe_op_in_unsafe_fn)]

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ring;
pub mod wait;

#[cfg(test)]
pub(crate) mod mock;

pub use channel::{SerialChannel, SerialPort};
pub use config::ChannelConfig;
pub use dispatch::{service_until_idle, DropCounters, InterruptDispatcher, Serviced};
pub use error::SerialError;
pub use ring::{CircularByteBuffer, Consumer, Producer};
pub use wait::{Spin, Wait};
