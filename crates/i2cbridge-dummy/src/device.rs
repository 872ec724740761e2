//! Emulated register-pointer device

/// A device with a register file and an auto-incrementing pointer
///
/// This is how most small I2C peripherals (EEPROMs, RTCs, sensors) behave:
/// the first byte of a write transaction selects a register, further
/// bytes are stored starting there. Reads return data from the current
/// pointer. Both directions advance the pointer and wrap at the end of
/// the register file.
#[derive(Debug, Clone)]
pub struct RegisterDevice {
    address: u8,
    registers: Vec<u8>,
    pointer: usize,
    read_only: bool,
}

impl RegisterDevice {
    /// Create a device with `size` registers set to `fill`
    pub fn new(address: u8, size: usize, fill: u8) -> Self {
        Self {
            address,
            registers: vec![fill; size],
            pointer: 0,
            read_only: false,
        }
    }

    /// Create a device whose register file is `data`
    pub fn with_data(address: u8, data: &[u8]) -> Self {
        Self {
            address,
            registers: data.to_vec(),
            pointer: 0,
            read_only: false,
        }
    }

    /// Refuse (NACK) data bytes after the register pointer
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// 7-bit address the device answers to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Current register pointer
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Register contents
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Mutable register contents
    pub fn registers_mut(&mut self) -> &mut [u8] {
        &mut self.registers
    }

    /// Whether data writes are refused
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Point at a register, wrapping at the register file size
    pub fn set_pointer(&mut self, register: u8) {
        self.pointer = usize::from(register) % self.registers.len().max(1);
    }

    /// Store a byte at the pointer and advance
    ///
    /// Returns `false` (NACK) if the device is read-only.
    pub fn write(&mut self, value: u8) -> bool {
        if self.read_only || self.registers.is_empty() {
            return false;
        }
        self.registers[self.pointer] = value;
        self.advance();
        true
    }

    /// Fetch the byte at the pointer and advance
    pub fn read(&mut self) -> u8 {
        let Some(&value) = self.registers.get(self.pointer) else {
            // An empty register file floats high
            return 0xFF;
        };
        self.advance();
        value
    }

    fn advance(&mut self) {
        self.pointer = (self.pointer + 1) % self.registers.len();
    }
}
