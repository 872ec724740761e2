//! Chunked OUT/IN transfers over the I2C stream
//!
//! An OUT packet carries at most [`MAX_OUT_DATA`] bytes and is answered
//! with one status byte; an IN packet asks for at most [`I2C_STM_MAX`]
//! bytes. Longer transfers are split here.

use crate::error::{Ch341Error, Result};
use crate::protocol::{is_ack, out_packet, read_packet, I2C_STM_MAX, MAX_OUT_DATA};

/// Packet-level access to the bulk endpoints
pub(crate) trait Transport {
    /// Send one stream packet
    fn send_packet(&mut self, command: &'static str, packet: &[u8]) -> Result<()>;

    /// Read one response of up to `len` bytes
    fn usb_read(&mut self, len: usize) -> Result<Vec<u8>>;
}

/// Clock `data` out, stopping at the first chunk that is not acknowledged
///
/// Returns `Ok(false)` on a NACK.
pub(crate) fn write_chunked<T: Transport + ?Sized>(transport: &mut T, data: &[u8]) -> Result<bool> {
    for chunk in data.chunks(MAX_OUT_DATA) {
        transport.send_packet("OUT", &out_packet(chunk))?;
        let response = transport.usb_read(1)?;
        if !is_ack(&response) {
            log::trace!("NACK on {:02X?}", chunk);
            return Ok(false);
        }
    }
    Ok(true)
}

/// Clock `buf.len()` bytes in
pub(crate) fn read_chunked<T: Transport + ?Sized>(transport: &mut T, buf: &mut [u8]) -> Result<()> {
    for chunk in buf.chunks_mut(I2C_STM_MAX) {
        transport.send_packet("IN", &read_packet(chunk.len()))?;
        let response = transport.usb_read(chunk.len())?;
        if response.len() != chunk.len() {
            return Err(Ch341Error::InvalidResponse(format!(
                "expected {} bytes, got {}",
                chunk.len(),
                response.len()
            )));
        }
        chunk.copy_from_slice(&response);
    }
    Ok(())
}
