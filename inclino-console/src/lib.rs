//! Serial command console for the angle gauge
//!
//! A small interactive shell that runs over any byte stream implementing the
//! `embedded-io` traits, normally the blocking `SerialPort` from
//! `inclino-core`.
//!
//! # Session
//!
//! ```text
//! ? help
//! Command help  :  List every command
//! Command stats  :  Show receive drop counters
//! ? target 45
//! ```
//!
//! Input is echoed as it is typed. A carriage return ends the line, and
//! backspace or delete erases the previous character.

#![cfg_attr(not(test), no_std)]

pub mod args;
pub mod command;
pub mod error;
pub mod line;

#[cfg(test)]
pub(crate) mod mock;

pub use args::{parse_angle, tokenize, Args, MAX_ANGLE, MAX_ARGS};
pub use command::{Command, CommandTable, Console, Handler, Outcome, PROMPT};
pub use error::ConsoleError;
pub use line::LineEditor;
