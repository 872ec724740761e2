//! Adapter capability flags

use bitflags::bitflags;

bitflags! {
    /// I2C/SMBus functionality flags
    ///
    /// Bit values follow the Linux `I2C_FUNC_*` constants, which is what
    /// smbus2 reports from `SMBus.funcs`, so existing client code can keep
    /// checking the same bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Functionality: u32 {
        /// Plain I2C-level transfers
        const I2C                    = 0x0000_0001;
        /// 10-bit addressing
        const TEN_BIT_ADDR           = 0x0000_0002;
        /// Protocol mangling (ignore NACK, no STOP, ...)
        const PROTOCOL_MANGLING      = 0x0000_0004;
        /// SMBus Packet Error Checking
        const SMBUS_PEC              = 0x0000_0008;
        /// Transfers without a leading START
        const NOSTART                = 0x0000_0010;
        /// Slave mode
        const SLAVE                  = 0x0000_0020;
        /// SMBus block process call
        const SMBUS_BLOCK_PROC_CALL  = 0x0000_8000;
        /// SMBus quick command
        const SMBUS_QUICK            = 0x0001_0000;
        /// SMBus receive byte
        const SMBUS_READ_BYTE        = 0x0002_0000;
        /// SMBus send byte
        const SMBUS_WRITE_BYTE       = 0x0004_0000;
        /// SMBus read byte data
        const SMBUS_READ_BYTE_DATA   = 0x0008_0000;
        /// SMBus write byte data
        const SMBUS_WRITE_BYTE_DATA  = 0x0010_0000;
        /// SMBus read word data
        const SMBUS_READ_WORD_DATA   = 0x0020_0000;
        /// SMBus write word data
        const SMBUS_WRITE_WORD_DATA  = 0x0040_0000;
        /// SMBus process call
        const SMBUS_PROC_CALL        = 0x0080_0000;
        /// SMBus block read
        const SMBUS_READ_BLOCK_DATA  = 0x0100_0000;
        /// SMBus block write
        const SMBUS_WRITE_BLOCK_DATA = 0x0200_0000;
        /// I2C block read (no count byte)
        const SMBUS_READ_I2C_BLOCK   = 0x0400_0000;
        /// I2C block write (no count byte)
        const SMBUS_WRITE_I2C_BLOCK  = 0x0800_0000;
        /// SMBus host notify
        const SMBUS_HOST_NOTIFY      = 0x1000_0000;

        /// Send and receive byte
        const SMBUS_BYTE = Self::SMBUS_READ_BYTE.bits() | Self::SMBUS_WRITE_BYTE.bits();
        /// Read and write byte data
        const SMBUS_BYTE_DATA =
            Self::SMBUS_READ_BYTE_DATA.bits() | Self::SMBUS_WRITE_BYTE_DATA.bits();
        /// Read and write word data
        const SMBUS_WORD_DATA =
            Self::SMBUS_READ_WORD_DATA.bits() | Self::SMBUS_WRITE_WORD_DATA.bits();
        /// Block read and write
        const SMBUS_BLOCK_DATA =
            Self::SMBUS_READ_BLOCK_DATA.bits() | Self::SMBUS_WRITE_BLOCK_DATA.bits();
        /// I2C block read and write
        const SMBUS_I2C_BLOCK =
            Self::SMBUS_READ_I2C_BLOCK.bits() | Self::SMBUS_WRITE_I2C_BLOCK.bits();
        /// Everything that can be emulated on top of plain I2C transfers
        const SMBUS_EMUL = Self::SMBUS_QUICK.bits()
            | Self::SMBUS_BYTE.bits()
            | Self::SMBUS_BYTE_DATA.bits()
            | Self::SMBUS_WORD_DATA.bits()
            | Self::SMBUS_PROC_CALL.bits()
            | Self::SMBUS_WRITE_BLOCK_DATA.bits()
            | Self::SMBUS_I2C_BLOCK.bits()
            | Self::SMBUS_PEC.bits();
    }
}

impl Default for Functionality {
    /// Plain I2C plus every SMBus transaction, including the block reads
    /// that the emulation layer drives byte by byte
    fn default() -> Self {
        Functionality::I2C
            | Functionality::SMBUS_EMUL
            | Functionality::SMBUS_READ_BLOCK_DATA
            | Functionality::SMBUS_BLOCK_PROC_CALL
    }
}
