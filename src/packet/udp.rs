// src/packet/udp.rs
use super::{Layer, Layers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    /// Total length incl. header + data, as carried on the wire.
    pub length: u16,
}

/// Parses a UDP header (minimum 8 bytes).
///
/// # Arguments
/// * `header` - A byte slice containing the UDP header (at least 8 bytes)
///
/// # Returns
/// * `Ok(UdpHeader)` on success
/// * `Err(&'static str)` on failure due to insufficient length
pub fn parse_udp_header(header: &[u8]) -> Result<UdpHeader, &'static str> {
    if header.len() < 8 {
        return Err("UDP header too short");
    }

    Ok(UdpHeader {
        src_port: u16::from_be_bytes([header[0], header[1]]),
        dst_port: u16::from_be_bytes([header[2], header[3]]),
        length: u16::from_be_bytes([header[4], header[5]]),
    })
}

pub fn parse_udp(payload: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    let header = parse_udp_header(payload)?;
    layers.push(Layer::Udp(header));
    Ok(())
}
