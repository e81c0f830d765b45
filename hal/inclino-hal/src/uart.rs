//! UART serial communication abstractions
//!
//! Describes the register surface an interrupt-driven UART exposes: a
//! latched receive data register, a transmit data register, status and
//! line-error flags, and the transmit-interrupt-enable bit. Receive
//! interrupts are expected to stay enabled once the chip driver has
//! initialized the peripheral.

/// Line error flags reported by the receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineErrors {
    /// Receiver overrun (a character arrived before the previous one was read)
    pub overrun: bool,
    /// Framing error (missing stop bit)
    pub framing: bool,
    /// Parity mismatch
    pub parity: bool,
}

impl LineErrors {
    /// No errors
    pub const NONE: Self = Self {
        overrun: false,
        framing: false,
        parity: false,
    };

    /// Every error flag, used to clear them all at once
    pub const ALL: Self = Self {
        overrun: true,
        framing: true,
        parity: true,
    };

    /// Check if any error flag is set
    pub fn any(&self) -> bool {
        self.overrun || self.framing || self.parity
    }
}

/// Snapshot of the UART status register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineStatus {
    /// A received character is waiting in the data register
    pub rx_ready: bool,
    /// The transmit data register can accept another character
    pub tx_ready: bool,
    /// Error flags attached to the current receive slot
    pub errors: LineErrors,
}

/// Register-level access used from interrupt context
///
/// Implementations wrap the memory-mapped registers of one UART. All
/// methods are called from the interrupt handler only, except where noted
/// on [`TxInterruptControl`].
pub trait UartRegisters {
    /// Read the status flags
    ///
    /// Takes `&mut self` because some peripherals only reveal the error
    /// state of a character once it has been pulled out of their FIFO.
    fn status(&mut self) -> LineStatus;

    /// Read the receive data register, consuming the latched character
    fn read_data(&mut self) -> u8;

    /// Write the transmit data register, starting transmission of `byte`
    fn write_data(&mut self, byte: u8);

    /// Clear the given error flags using the device's clear semantics
    fn clear_errors(&mut self, errors: LineErrors);

    /// Enable or disable the transmit-ready interrupt
    fn set_tx_interrupt(&mut self, enabled: bool);
}

/// Foreground capability to start transmit draining
///
/// Handed to the blocking port so `write` can switch the transmit
/// interrupt on. Implementations must make the read-modify-write of the
/// control register atomic with respect to the interrupt handler, and must
/// make sure a transmit-ready interrupt actually fires even on peripherals
/// whose transmit interrupt is edge-triggered.
pub trait TxInterruptControl {
    /// Enable the transmit-ready interrupt
    fn enable_tx_interrupt(&mut self);
}

/// Errors from validating a UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate is zero
    InvalidBaudRate,
    /// Oversampling ratio outside the supported range
    InvalidOversample,
    /// The computed divisor does not fit the divisor register
    DivisorOutOfRange,
}

/// Smallest oversampling ratio a receiver can use
pub const MIN_OVERSAMPLE: u32 = 4;

/// Largest oversampling ratio a receiver can use
pub const MAX_OVERSAMPLE: u32 = 32;

/// Largest value of a 13-bit baud-rate divisor register
pub const MAX_DIVISOR: u16 = 0x1FFF;

/// UART configuration
///
/// Fixed at initialization; the serial core never reconfigures the line
/// at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 38400,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::Two,
        }
    }
}

impl UartConfig {
    /// Compute the integer baud-rate divisor for a module clock
    ///
    /// `divisor = clock_hz / (baudrate * oversample)`, truncated, as used by
    /// UARTs with an integer divisor and a programmable oversampling ratio.
    pub fn divisor(&self, clock_hz: u32, oversample: u32) -> Result<u16, ConfigError> {
        if self.baudrate == 0 {
            return Err(ConfigError::InvalidBaudRate);
        }
        if !(MIN_OVERSAMPLE..=MAX_OVERSAMPLE).contains(&oversample) {
            return Err(ConfigError::InvalidOversample);
        }

        let per_bit = (self.baudrate as u64) * (oversample as u64);
        let divisor = clock_hz as u64 / per_bit;
        if divisor == 0 || divisor > MAX_DIVISOR as u64 {
            return Err(ConfigError::DivisorOutOfRange);
        }

        Ok(divisor as u16)
    }

    /// Number of bit times one character occupies on the wire
    pub fn frame_bits(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        };
        let parity = if self.parity == Parity::None { 0 } else { 1 };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + data + parity + stop
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_gauge_line() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 38400);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert_eq!(config.frame_bits(), 11);
    }

    #[test]
    fn test_divisor_for_24mhz_clock() {
        // 24 MHz / (38400 * 15) = 41.67 -> 41
        let config = UartConfig::default();
        assert_eq!(config.divisor(24_000_000, 15), Ok(41));
    }

    #[test]
    fn test_divisor_rejects_zero_baud() {
        let config = UartConfig {
            baudrate: 0,
            ..UartConfig::default()
        };
        assert_eq!(
            config.divisor(24_000_000, 15),
            Err(ConfigError::InvalidBaudRate)
        );
    }

    #[test]
    fn test_divisor_rejects_bad_oversample() {
        let config = UartConfig::default();
        assert_eq!(
            config.divisor(24_000_000, 3),
            Err(ConfigError::InvalidOversample)
        );
        assert_eq!(
            config.divisor(24_000_000, 33),
            Err(ConfigError::InvalidOversample)
        );
    }

    #[test]
    fn test_divisor_out_of_range() {
        // Baud rate faster than the clock can produce
        let fast = UartConfig {
            baudrate: 3_000_000,
            ..UartConfig::default()
        };
        assert_eq!(
            fast.divisor(24_000_000, 16),
            Err(ConfigError::DivisorOutOfRange)
        );

        // Baud rate so slow the divisor overflows 13 bits
        let slow = UartConfig {
            baudrate: 50,
            ..UartConfig::default()
        };
        assert_eq!(
            slow.divisor(48_000_000, 16),
            Err(ConfigError::DivisorOutOfRange)
        );
    }

    #[test]
    fn test_line_errors_any() {
        assert!(!LineErrors::NONE.any());
        assert!(LineErrors::ALL.any());
        let framing = LineErrors {
            framing: true,
            ..LineErrors::NONE
        };
        assert!(framing.any());
    }

    #[test]
    fn test_frame_bits_with_parity() {
        let config = UartConfig {
            baudrate: 9600,
            data_bits: DataBits::Seven,
            parity: Parity::Even,
            stop_bits: StopBits::One,
        };
        assert_eq!(config.frame_bits(), 10);
    }
}
