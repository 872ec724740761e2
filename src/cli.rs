//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex or decimal u8
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let value = parse_hex_u32(s)?;
    u8::try_from(value).map_err(|_| format!("Value out of range (0-0xFF): {}", s))
}

/// Generate dynamic help text for the adapter argument
fn adapter_help() -> String {
    format!(
        "Adapter to use, with options as name:key=value,... [available: {}]",
        i2cbridge_bus::adapter_names_short()
    )
}

#[derive(Parser)]
#[command(name = "i2cbridge")]
#[command(author, version, about = "I2C/SMBus tools for CH341 USB bridges", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Bus options shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct BusArgs {
    #[arg(short, long, help = adapter_help())]
    pub adapter: String,

    /// Enable SMBus Packet Error Checking
    #[arg(long)]
    pub pec: bool,

    /// Use a repeated START between the write and read phase of register reads
    #[arg(long)]
    pub restart: bool,
}

/// Transfer size for get and set
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Single byte (receive/send byte without a register)
    #[default]
    Byte,
    /// 16-bit word, LSB first on the wire
    Word,
    /// SMBus block with a length byte
    Block,
    /// Raw I2C block without a length byte
    I2cBlock,
}

/// Transfer size for dump
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpMode {
    /// One byte per register
    #[default]
    Byte,
    /// One 16-bit word per register
    Word,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List adapters compiled into this build
    ListAdapters,

    /// List attached USB bridges
    ListDevices,

    /// Scan the bus for devices
    Detect {
        #[command(flatten)]
        bus: BusArgs,

        /// Scan every address including the reserved ones (0x00-0x7F)
        #[arg(long, conflicts_with_all = ["first", "last"])]
        all: bool,

        /// First address to probe (default 0x03)
        #[arg(long, value_parser = parse_hex_u8)]
        first: Option<u8>,

        /// Last address to probe (default 0x77)
        #[arg(long, value_parser = parse_hex_u8)]
        last: Option<u8>,
    },

    /// Read from a device
    Get {
        #[command(flatten)]
        bus: BusArgs,

        /// 7-bit device address (e.g., 0x50)
        #[arg(value_parser = parse_hex_u8)]
        chip: u8,

        /// Register to read (omit for a receive-byte transfer)
        #[arg(value_parser = parse_hex_u8)]
        register: Option<u8>,

        /// Transfer size
        #[arg(short, long, value_enum, default_value_t = Mode::Byte)]
        mode: Mode,

        /// Number of bytes for i2c-block reads
        #[arg(short, long, default_value_t = 32)]
        length: usize,
    },

    /// Write to a device
    Set {
        #[command(flatten)]
        bus: BusArgs,

        /// 7-bit device address (e.g., 0x50)
        #[arg(value_parser = parse_hex_u8)]
        chip: u8,

        /// Register to write (or the byte itself for a send-byte transfer)
        #[arg(value_parser = parse_hex_u8)]
        register: u8,

        /// Values to write (hex or decimal)
        #[arg(value_parser = parse_hex_u32)]
        values: Vec<u32>,

        /// Transfer size
        #[arg(short, long, value_enum, default_value_t = Mode::Byte)]
        mode: Mode,
    },

    /// Dump a range of registers
    Dump {
        #[command(flatten)]
        bus: BusArgs,

        /// 7-bit device address (e.g., 0x50)
        #[arg(value_parser = parse_hex_u8)]
        chip: u8,

        /// Transfer size
        #[arg(short, long, value_enum, default_value_t = DumpMode::Byte)]
        mode: DumpMode,

        /// First register
        #[arg(long, value_parser = parse_hex_u8, default_value = "0x00")]
        first: u8,

        /// Last register
        #[arg(long, value_parser = parse_hex_u8, default_value = "0xFF")]
        last: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex_u32("0x50"), Ok(0x50));
        assert_eq!(parse_hex_u32("0XfF"), Ok(0xFF));
        assert_eq!(parse_hex_u32("80"), Ok(80));
        assert!(parse_hex_u32("0xZZ").is_err());
        assert_eq!(parse_hex_u8("0x7f"), Ok(0x7F));
        assert!(parse_hex_u8("0x100").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get() {
        let cli = Cli::parse_from([
            "i2cbridge", "get", "-a", "dummy", "--pec", "0x50", "0x10", "--mode", "word",
        ]);
        match cli.command {
            Commands::Get {
                bus,
                chip,
                register,
                mode,
                ..
            } => {
                assert_eq!(bus.adapter, "dummy");
                assert!(bus.pec);
                assert_eq!(chip, 0x50);
                assert_eq!(register, Some(0x10));
                assert_eq!(mode, Mode::Word);
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_parse_set_values() {
        let cli = Cli::parse_from(["i2cbridge", "set", "-a", "dummy", "0x68", "0", "1", "0x02"]);
        match cli.command {
            Commands::Set { values, mode, .. } => {
                assert_eq!(values, vec![1, 2]);
                assert_eq!(mode, Mode::Byte);
            }
            _ => panic!("expected set"),
        }
    }
}
