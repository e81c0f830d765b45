//! Argument splitting and parsing

use heapless::Vec;

use crate::error::ConsoleError;

/// Most tokens kept from one line, command name included
pub const MAX_ARGS: usize = 10;

/// Largest angle accepted by [`parse_angle`], in degrees
pub const MAX_ANGLE: u16 = 180;

/// Tokens of one command line, borrowed from the line buffer
pub type Args<'a> = Vec<&'a str, MAX_ARGS>;

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Split a line on spaces, tabs, CR and LF
///
/// Runs of separators count as one. Tokens past [`MAX_ARGS`] are ignored.
pub fn tokenize(line: &str) -> Args<'_> {
    line.split(is_separator)
        .filter(|token| !token.is_empty())
        .take(MAX_ARGS)
        .collect()
}

/// Parse a decimal angle in `0..=180` degrees
pub fn parse_angle<E>(arg: &str) -> Result<u16, ConsoleError<E>> {
    match arg.parse::<u16>() {
        Ok(angle) if angle <= MAX_ANGLE => Ok(angle),
        _ => Err(ConsoleError::InvalidAngle),
    }
}
