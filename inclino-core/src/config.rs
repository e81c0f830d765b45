//! Channel configuration
//!
//! Everything here is fixed when the channel is built. Buffer capacities
//! are const generics on [`SerialChannel`](crate::SerialChannel); this only
//! carries the runtime-valued settings.

/// Mask applied to received characters for 7-bit ASCII terminals
pub const ASCII_MASK: u8 = 0x7F;

/// Serial channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Bits of each received character that are kept
    pub rx_data_mask: u8,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::ascii()
    }
}

impl ChannelConfig {
    /// Keep the low 7 bits of every received character
    pub const fn ascii() -> Self {
        Self {
            rx_data_mask: ASCII_MASK,
        }
    }

    /// Keep every bit the line carries
    pub const fn raw() -> Self {
        Self { rx_data_mask: 0xFF }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ascii() {
        assert_eq!(ChannelConfig::default().rx_data_mask, 0x7F);
    }

    #[test]
    fn test_raw_keeps_every_bit() {
        assert_eq!(ChannelConfig::raw().rx_data_mask, 0xFF);
    }
}
