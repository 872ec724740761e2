//! Dump command implementation

use crate::cli::DumpMode;
use i2cbridge_bus::BusHandle;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;

/// Run the dump command
pub fn run_dump(
    handle: &mut BusHandle,
    chip: u8,
    mode: DumpMode,
    first: u8,
    last: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    if first > last {
        return Err(format!("First register 0x{:02X} is above last 0x{:02X}", first, last).into());
    }
    if !handle.detect(chip)? {
        return Err(format!("No device at address 0x{:02X}", chip).into());
    }

    let values = read_registers(handle, chip, mode, first, last)?;

    let table = match mode {
        DumpMode::Byte => format_bytes(first, last, &values),
        DumpMode::Word => format_words(first, last, &values),
    };
    print!("{}", table);
    Ok(())
}

/// Read every register in `first..=last`, keeping failures as `None`
fn read_registers(
    handle: &mut BusHandle,
    chip: u8,
    mode: DumpMode,
    first: u8,
    last: u8,
) -> Result<Vec<Option<u16>>, Box<dyn std::error::Error>> {
    let count = usize::from(last - first) + 1;

    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} registers ({eta})")?
            .progress_chars("#>-"),
    );

    let mut values = Vec::with_capacity(count);
    for register in first..=last {
        let result = match mode {
            DumpMode::Byte => handle.read_byte_data(chip, register).map(u16::from),
            DumpMode::Word => handle.read_word_data(chip, register),
        };
        match result {
            Ok(value) => values.push(Some(value)),
            Err(e) if e.is_nack() || matches!(e, i2cbridge_bus::Error::PecMismatch { .. }) => {
                log::debug!("Register 0x{:02X}: {}", register, e);
                values.push(None);
            }
            Err(e) => {
                pb.abandon();
                return Err(e.into());
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(values)
}

/// Render an i2cdump-style byte table
///
/// `values[i]` belongs to register `first + i`. Registers outside the
/// range are blank, failed reads show `XX`.
pub fn format_bytes(first: u8, last: u8, values: &[Option<u16>]) -> String {
    let mut out = String::from(
        "     0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f    0123456789abcdef\n",
    );

    let mut row = first & 0xF0;
    loop {
        let _ = write!(out, "{:02x}: ", row);
        let mut ascii = String::with_capacity(16);

        for col in 0..16u8 {
            let register = row + col;
            if register < first || register > last {
                out.push_str("   ");
                ascii.push(' ');
                continue;
            }
            match values[usize::from(register - first)] {
                Some(value) => {
                    let byte = value as u8;
                    let _ = write!(out, "{:02x} ", byte);
                    ascii.push(printable(byte));
                }
                None => {
                    out.push_str("XX ");
                    ascii.push('X');
                }
            }
        }

        let _ = writeln!(out, "   {}", ascii);

        if row >= (last & 0xF0) {
            break;
        }
        row += 0x10;
    }

    out
}

/// Render an i2cdump-style word table, eight registers per row
pub fn format_words(first: u8, last: u8, values: &[Option<u16>]) -> String {
    let mut out = String::from("     0,8  1,9  2,a  3,b  4,c  5,d  6,e  7,f\n");

    let mut row = first & 0xF8;
    loop {
        let _ = write!(out, "{:02x}: ", row);
        for col in 0..8u8 {
            let register = row + col;
            if register < first || register > last {
                out.push_str("     ");
                continue;
            }
            match values[usize::from(register - first)] {
                Some(value) => {
                    let _ = write!(out, "{:04x} ", value);
                }
                None => out.push_str("XXXX "),
            }
        }
        out.truncate(out.trim_end_matches(' ').len());
        out.push('\n');

        if row >= (last & 0xF8) {
            break;
        }
        row += 0x08;
    }

    out
}

/// ASCII column character for a byte
fn printable(byte: u8) -> char {
    match byte {
        0x00 | 0xFF => '.',
        0x20..=0x7E => byte as char,
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_table_row() {
        let values: Vec<Option<u16>> = (0..16u16)
            .map(|i| match i {
                1 => Some(0x41),
                2 => None,
                3 => Some(0x00),
                _ => Some(0xFF),
            })
            .collect();
        let table = format_bytes(0x00, 0x0F, &values);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "00: ff 41 XX 00 ff ff ff ff ff ff ff ff ff ff ff ff    .AX............."
        );
    }

    #[test]
    fn test_byte_table_partial_range() {
        let values = vec![Some(0x30), Some(0x31)];
        let table = format_bytes(0x1E, 0x1F, &values);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with(&format!("10: {}30 31", " ".repeat(14 * 3))));
        assert!(lines[1].ends_with("01"));
    }

    #[test]
    fn test_word_table() {
        let values = vec![Some(0x1234), None, Some(0xBEEF)];
        let table = format_words(0x00, 0x02, &values);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "     0,8  1,9  2,a  3,b  4,c  5,d  6,e  7,f");
        assert_eq!(lines[1], "00: 1234 XXXX beef");
    }

    #[test]
    fn test_printable() {
        assert_eq!(printable(b'A'), 'A');
        assert_eq!(printable(0x00), '.');
        assert_eq!(printable(0xFF), '.');
        assert_eq!(printable(0x80), '?');
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_read_registers_from_dummy() {
        let mut bus = i2cbridge_bus::open_bus("dummy").unwrap();
        bus.write_byte_data(0x68, 0x01, 0x42).unwrap();
        let values = read_registers(&mut bus, 0x68, DumpMode::Byte, 0x00, 0x07).unwrap();
        assert_eq!(values.len(), 8);
        assert_eq!(values[1], Some(0x42));
    }
}
