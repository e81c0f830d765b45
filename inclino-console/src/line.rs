//! Echoing line editor

use embedded_io::{Read, Write};
use heapless::String;

use crate::error::ConsoleError;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Collects one line of input, echoing it back as it is typed
///
/// Holds at most `LEN` characters. Printable ASCII and tab are kept,
/// other control bytes are ignored.
#[derive(Debug, Default)]
pub struct LineEditor<const LEN: usize> {
    line: String<LEN>,
}

impl<const LEN: usize> LineEditor<LEN> {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
        }
    }

    /// Characters collected so far
    pub fn as_str(&self) -> &str {
        self.line.as_str()
    }

    pub fn clear(&mut self) {
        self.line.clear();
    }

    /// Apply one input byte, echoing its effect to `echo`
    ///
    /// Returns `true` once a carriage return completes the line.
    pub fn push_byte<W: Write>(&mut self, byte: u8, echo: &mut W) -> Result<bool, W::Error> {
        match byte {
            CR => {
                echo.write_all(b"\r\n")?;
                return Ok(true);
            }
            // Terminals sending CR LF
            LF => {}
            BACKSPACE | DELETE => {
                if self.line.pop().is_some() {
                    echo.write_all(b"\x08 \x08")?;
                }
            }
            b'\t' | 0x20..=0x7E => {
                // Full line: drop the character without echo
                if self.line.push(byte as char).is_ok() {
                    echo.write_all(&[byte])?;
                }
            }
            _ => {}
        }
        Ok(false)
    }

    /// Read and echo bytes until a carriage return, returning the line
    pub fn read_line<S: Read + Write>(&mut self, io: &mut S) -> Result<&str, ConsoleError<S::Error>> {
        self.line.clear();
        let mut byte = [0u8; 1];
        loop {
            if io.read(&mut byte).map_err(ConsoleError::Io)? == 0 {
                return Err(ConsoleError::Eof);
            }
            if self.push_byte(byte[0], io).map_err(ConsoleError::Io)? {
                return Ok(self.line.as_str());
            }
        }
    }
}
