//! Console errors

use core::fmt;

use embedded_io::WriteFmtError;

/// Errors raised while reading, writing or interpreting console input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError<E> {
    /// The underlying stream failed
    Io(E),
    /// The stream reported end of input
    Eof,
    /// Formatting output failed
    Format,
    /// Angle argument is not a whole number of degrees in range
    InvalidAngle,
}

impl<E> From<WriteFmtError<E>> for ConsoleError<E> {
    fn from(err: WriteFmtError<E>) -> Self {
        match err {
            WriteFmtError::Other(e) => Self::Io(e),
            WriteFmtError::FmtError => Self::Format,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for ConsoleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e:?}"),
            Self::Eof => write!(f, "end of input"),
            Self::Format => write!(f, "formatting failed"),
            Self::InvalidAngle => write!(f, "Invalid angle input"),
        }
    }
}
