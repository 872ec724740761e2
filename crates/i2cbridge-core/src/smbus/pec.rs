//! SMBus Packet Error Code (CRC-8, polynomial x^8 + x^2 + x + 1)

const POLY: u8 = 0x07;

/// Update a CRC-8 with `data`
pub fn crc8(mut crc: u8, data: &[u8]) -> u8 {
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Running PEC over the bytes of one SMBus message
///
/// Every byte on the wire counts, including address bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pec(u8);

impl Pec {
    /// Start a new PEC computation
    pub fn new() -> Self {
        Self(0)
    }

    /// Feed more message bytes
    pub fn update(self, data: &[u8]) -> Self {
        Self(crc8(self.0, data))
    }

    /// The PEC byte for everything fed so far
    pub fn value(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        // CRC-8/SMBUS catalogue check value
        assert_eq!(crc8(0, b"123456789"), 0xF4);
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let pec = Pec::new().update(&[0xA0, 0x10]).update(&[0x55]);
        assert_eq!(pec.value(), crc8(0, &[0xA0, 0x10, 0x55]));
    }

    #[test]
    fn test_empty() {
        assert_eq!(Pec::new().update(&[]).value(), 0);
    }
}
