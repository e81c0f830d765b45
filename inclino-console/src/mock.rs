//! Scripted byte stream for unit tests

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_io::{ErrorType, Read, Write};

/// Replays fixed input and records everything written
#[derive(Debug, Default)]
pub(crate) struct ScriptedIo {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl ScriptedIo {
    pub(crate) fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    pub(crate) fn output(&self) -> &[u8] {
        &self.output
    }

    pub(crate) fn output_str(&self) -> &str {
        core::str::from_utf8(&self.output).unwrap()
    }
}

impl ErrorType for ScriptedIo {
    type Error = Infallible;
}

impl Read for ScriptedIo {
    /// One byte per call, zero once the script runs out
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match (buf.first_mut(), self.input.pop_front()) {
            (Some(slot), Some(byte)) => {
                *slot = byte;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

impl Write for ScriptedIo {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
