//! Six-byte hardware addresses.

use core::fmt;
use core::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::RegistryError;

/// Hardware address of a block.
///
/// Addresses starting with five zero bytes are reserved for virtual
/// placeholders; the last byte is the placeholder's number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Broadcast address used for scans.
    pub const BROADCAST: Self = Self([0xFF; 6]);

    /// Create an address from raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Placeholder address for a virtual block.
    #[inline]
    pub const fn virtual_for(number: u8) -> Self {
        Self([0, 0, 0, 0, 0, number])
    }

    /// Raw bytes.
    #[inline]
    pub const fn bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Whether this is a placeholder address.
    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.0[..5].iter().all(|&b| b == 0)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            let mut text = heapless::String::new();
            for c in s.chars().take(64) {
                let _ = text.push(c);
            }
            RegistryError::InvalidRecord(text)
        };

        let mut bytes = [0u8; 6];
        let mut parts = s.trim().split(':');
        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(bytes))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let mac = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x01]);
        assert_eq!(format!("{}", mac), "AA:BB:CC:DD:EE:01");
        assert_eq!("aa:bb:cc:dd:ee:01".parse::<MacAddress>().unwrap(), mac);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("AA:BB:CC".parse::<MacAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:FF:00".parse::<MacAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:GG".parse::<MacAddress>().is_err());
    }

    #[test]
    fn test_virtual() {
        assert!(MacAddress::virtual_for(7).is_virtual());
        assert!(!MacAddress::new([0, 0, 0, 0, 1, 7]).is_virtual());
    }
}
