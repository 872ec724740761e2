//! 7-bit I2C addresses

use core::fmt;

use crate::error::{Error, Result};

/// First address probed by a default scan (0x00-0x02 are reserved)
pub const SCAN_FIRST: u8 = 0x03;
/// Last address probed by a default scan (0x78-0x7F are reserved)
pub const SCAN_LAST: u8 = 0x77;
/// Highest 7-bit address
pub const ADDRESS_MAX: u8 = 0x7F;

/// Transfer direction encoded in bit 0 of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Master writes to the device (R/W bit = 0)
    Write,
    /// Master reads from the device (R/W bit = 1)
    Read,
}

/// A validated 7-bit I2C device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u8);

impl Address {
    /// Create an address, rejecting anything above 0x7F
    pub fn new(addr: u8) -> Result<Self> {
        if addr > ADDRESS_MAX {
            return Err(Error::InvalidAddress(addr));
        }
        Ok(Self(addr))
    }

    /// The raw 7-bit value
    pub fn value(self) -> u8 {
        self.0
    }

    /// Address byte for the given direction
    pub fn byte(self, dir: Direction) -> u8 {
        match dir {
            Direction::Write => self.0 << 1,
            Direction::Read => (self.0 << 1) | 1,
        }
    }

    /// Split an address byte into the address and the R/W direction
    pub fn from_byte(byte: u8) -> (Self, Direction) {
        let dir = if byte & 1 == 0 {
            Direction::Write
        } else {
            Direction::Read
        };
        (Self(byte >> 1), dir)
    }

    /// Address byte with the R/W bit cleared
    pub fn write_byte(self) -> u8 {
        self.byte(Direction::Write)
    }

    /// Address byte with the R/W bit set
    pub fn read_byte(self) -> u8 {
        self.byte(Direction::Read)
    }

    /// Whether the address lies in a reserved range (general call, CBUS,
    /// 10-bit prefix, ...)
    pub fn is_reserved(self) -> bool {
        self.0 < 0x08 || self.0 > SCAN_LAST
    }
}

impl TryFrom<u8> for Address {
    type Error = Error;

    fn try_from(addr: u8) -> Result<Self> {
        Self::new(addr)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_bytes() {
        let addr = Address::new(0x50).unwrap();
        assert_eq!(addr.write_byte(), 0xA0);
        assert_eq!(addr.read_byte(), 0xA1);
        assert_eq!(addr.byte(Direction::Read), 0xA1);
        assert_eq!(Address::from_byte(0xA1), (addr, Direction::Read));
        assert_eq!(Address::from_byte(0xFE).0.value(), 0x7F);
    }

    #[test]
    fn test_address_range() {
        assert!(Address::new(0x7F).is_ok());
        assert_eq!(Address::new(0x80), Err(Error::InvalidAddress(0x80)));
        assert_eq!(Address::try_from(0xFA), Err(Error::InvalidAddress(0xFA)));
    }

    #[test]
    fn test_reserved() {
        assert!(Address::new(0x00).unwrap().is_reserved());
        assert!(Address::new(0x07).unwrap().is_reserved());
        assert!(!Address::new(0x08).unwrap().is_reserved());
        assert!(!Address::new(0x77).unwrap().is_reserved());
        assert!(Address::new(0x78).unwrap().is_reserved());
    }
}
