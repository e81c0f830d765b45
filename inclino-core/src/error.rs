//! Serial channel errors
//!
//! Full and empty buffers are not errors: the blocking calls wait them out,
//! and the interrupt side drops and counts. The only failure a caller can
//! see is a rejected argument.

use core::fmt;

/// Errors returned by the serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// No buffer was supplied
    InvalidArgument,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::InvalidArgument => f.write_str("invalid argument"),
        }
    }
}

impl embedded_io::Error for SerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            SerialError::InvalidArgument => embedded_io::ErrorKind::InvalidInput,
        }
    }
}
