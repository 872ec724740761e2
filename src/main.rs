//! i2cbridge - I2C/SMBus tools for CH341 USB bridges
//!
//! An i2c-tools style front end (detect, get, set, dump) for USB bridges
//! that expose an I2C master.
//!
//! # Architecture
//!
//! Every adapter implements the primitive `I2cMaster` trait (START, bytes
//! out, bytes in, STOP). `i2cbridge-core` builds complete transactions and
//! the smbus2-style `SmBus` API on top of it, and `i2cbridge-bus` opens an
//! adapter from a string such as `ch341:speed=400`. The commands here only
//! ever see a `BusHandle`.

mod cli;
mod commands;

use clap::Parser;
use cli::{BusArgs, Cli, Commands};
use i2cbridge_bus::{open_bus, BusHandle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG still takes precedence over -v
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .init();

    match cli.command {
        Commands::ListAdapters => {
            commands::list_adapters();
            Ok(())
        }
        Commands::ListDevices => commands::list_devices(),
        Commands::Detect {
            bus,
            all,
            first,
            last,
        } => {
            let mut handle = open(&bus)?;
            let (first, last) = commands::detect::scan_range(all, first, last)?;
            commands::detect::run_detect(&mut handle, first, last)
        }
        Commands::Get {
            bus,
            chip,
            register,
            mode,
            length,
        } => {
            let mut handle = open(&bus)?;
            commands::transfer::run_get(&mut handle, chip, register, mode, length)
        }
        Commands::Set {
            bus,
            chip,
            register,
            values,
            mode,
        } => {
            let mut handle = open(&bus)?;
            commands::transfer::run_set(&mut handle, chip, register, &values, mode)
        }
        Commands::Dump {
            bus,
            chip,
            mode,
            first,
            last,
        } => {
            let mut handle = open(&bus)?;
            commands::dump::run_dump(&mut handle, chip, mode, first, last)
        }
    }
}

/// Default log filter for a `-v` count
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Open the adapter and apply the command-line bus flags
fn open(args: &BusArgs) -> Result<BusHandle, Box<dyn std::error::Error>> {
    let mut handle = open_bus(&args.adapter)?;
    if args.pec {
        handle.set_pec(true)?;
    }
    if args.restart {
        handle.set_repeated_start(true);
    }
    log::debug!("Opened {:?}", handle);
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_raises_log_filter() {
        assert_eq!(log_filter(0), "info");
        assert_eq!(log_filter(1), "debug");
        assert_eq!(log_filter(2), "trace");
        assert_eq!(log_filter(5), "trace");
    }
}
