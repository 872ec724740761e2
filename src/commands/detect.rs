//! Detect command implementation

use i2cbridge_bus::{BusHandle, SCAN_FIRST, SCAN_LAST};
use std::fmt::Write;

/// Highest 7-bit address
const ADDRESS_MAX: u8 = 0x7F;

/// Work out which addresses to probe from the command-line flags
pub fn scan_range(
    all: bool,
    first: Option<u8>,
    last: Option<u8>,
) -> Result<(u8, u8), Box<dyn std::error::Error>> {
    if all {
        return Ok((0x00, ADDRESS_MAX));
    }

    let first = first.unwrap_or(SCAN_FIRST);
    let last = last.unwrap_or(SCAN_LAST);
    if last > ADDRESS_MAX {
        return Err(format!("Last address 0x{:02X} exceeds 0x7F", last).into());
    }
    if first > last {
        return Err(format!("First address 0x{:02X} is above last 0x{:02X}", first, last).into());
    }
    Ok((first, last))
}

/// Run the detect command
pub fn run_detect(
    handle: &mut BusHandle,
    first: u8,
    last: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!(
        "Scanning {} for addresses 0x{:02X}-0x{:02X}",
        handle.adapter(),
        first,
        last
    );

    let found = handle.scan(first, last)?;
    print!("{}", format_grid(first, last, &found));

    log::info!("Found {} device(s)", found.len());
    Ok(())
}

/// Render an i2cdetect-style address grid
///
/// Addresses outside `first..=last` are left blank, probed addresses
/// without a device show `--`.
pub fn format_grid(first: u8, last: u8, found: &[u8]) -> String {
    let mut out = String::from("     0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f\n");

    let mut row = first & 0xF0;
    loop {
        let _ = write!(out, "{:02x}:", row);
        for col in 0..16u8 {
            let addr = row + col;
            if addr < first || addr > last {
                out.push_str("   ");
            } else if found.contains(&addr) {
                let _ = write!(out, " {:02x}", addr);
            } else {
                out.push_str(" --");
            }
        }
        out.push('\n');

        if row >= (last & 0xF0) {
            break;
        }
        row += 0x10;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_range_defaults() {
        assert_eq!(scan_range(false, None, None).unwrap(), (0x03, 0x77));
        assert_eq!(scan_range(true, None, None).unwrap(), (0x00, 0x7F));
        assert_eq!(scan_range(false, Some(0x40), None).unwrap(), (0x40, 0x77));
    }

    #[test]
    fn test_scan_range_invalid() {
        assert!(scan_range(false, Some(0x50), Some(0x40)).is_err());
        assert!(scan_range(false, None, Some(0x80)).is_err());
    }

    #[test]
    fn test_grid_single_row() {
        let grid = format_grid(0x50, 0x57, &[0x50, 0x53]);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            format!("50: 50 -- -- 53 -- -- -- --{}", " ".repeat(24))
        );
    }

    #[test]
    fn test_grid_default_range() {
        let grid = format_grid(0x03, 0x77, &[0x68]);
        let lines: Vec<&str> = grid.lines().collect();
        // Header plus rows 00 through 70
        assert_eq!(lines.len(), 9);
        assert!(lines[1].starts_with(&format!("00:{} --", " ".repeat(9))));
        assert!(lines[7].starts_with("60: -- -- -- -- -- -- -- -- 68 "));
        assert!(lines[8].ends_with(&format!("--{}", " ".repeat(24))));
    }
}
