//! Get and set command implementations

use crate::cli::Mode;
use i2cbridge_bus::{BusHandle, I2C_SMBUS_BLOCK_MAX};

/// Run the get command
pub fn run_get(
    handle: &mut BusHandle,
    chip: u8,
    register: Option<u8>,
    mode: Mode,
    length: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", get(handle, chip, register, mode, length)?);
    Ok(())
}

/// Read from a device and format the result
pub fn get(
    handle: &mut BusHandle,
    chip: u8,
    register: Option<u8>,
    mode: Mode,
    length: usize,
) -> Result<String, Box<dyn std::error::Error>> {
    let text = match (mode, register) {
        (Mode::Byte, None) => format!("0x{:02x}", handle.read_byte(chip)?),
        (Mode::Byte, Some(reg)) => format!("0x{:02x}", handle.read_byte_data(chip, reg)?),
        (Mode::Word, Some(reg)) => format!("0x{:04x}", handle.read_word_data(chip, reg)?),
        (Mode::Block, Some(reg)) => format_block(&handle.read_block_data(chip, reg)?),
        (Mode::I2cBlock, Some(reg)) => {
            format_block(&handle.read_i2c_block_data(chip, reg, length)?)
        }
        (mode, None) => return Err(format!("{:?} mode needs a register", mode).into()),
    };
    Ok(text)
}

/// Run the set command
pub fn run_set(
    handle: &mut BusHandle,
    chip: u8,
    register: u8,
    values: &[u32],
    mode: Mode,
) -> Result<(), Box<dyn std::error::Error>> {
    match mode {
        Mode::Byte => match values {
            [] => handle.write_byte(chip, register)?,
            [value] => handle.write_byte_data(chip, register, to_u8(*value)?)?,
            _ => return Err("Byte mode takes at most one value".into()),
        },
        Mode::Word => match values {
            [value] => {
                let word = u16::try_from(*value)
                    .map_err(|_| format!("Value out of range (0-0xFFFF): 0x{:X}", value))?;
                handle.write_word_data(chip, register, word)?
            }
            _ => return Err("Word mode takes exactly one value".into()),
        },
        Mode::Block => handle.write_block_data(chip, register, &block_values(values)?)?,
        Mode::I2cBlock => handle.write_i2c_block_data(chip, register, &block_values(values)?)?,
    }

    log::info!(
        "Wrote {} value(s) to 0x{:02X} register 0x{:02X}",
        values.len(),
        chip,
        register
    );
    Ok(())
}

fn to_u8(value: u32) -> Result<u8, Box<dyn std::error::Error>> {
    u8::try_from(value).map_err(|_| format!("Value out of range (0-0xFF): 0x{:X}", value).into())
}

fn block_values(values: &[u32]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if values.is_empty() || values.len() > I2C_SMBUS_BLOCK_MAX {
        return Err(format!(
            "Block modes take 1 to {} values, got {}",
            I2C_SMBUS_BLOCK_MAX,
            values.len()
        )
        .into());
    }
    values.iter().map(|v| to_u8(*v)).collect()
}

fn format_block(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
