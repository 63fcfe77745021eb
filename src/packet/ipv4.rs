use crate::packet::{Layer, Layers};
use std::net::Ipv4Addr;

const MORE_FRAGMENTS: u16 = 0x2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub protocol: u8,
    pub ttl: u8,
    pub more_fragments: bool,
    /// In 8-byte units.
    pub fragment_offset: u16,
    pub header_len: usize,
}

pub fn parse_ipv4(payload: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    if payload.len() < 20 {
        return Err("IPv4 header too short");
    }
    if payload[0] >> 4 != 4 {
        return Err("IPv4 version field mismatch");
    }

    let ihl = payload[0] & 0x0F;
    let ip_header_len = (ihl as usize) * 4;

    if ip_header_len < 20 {
        return Err("IPv4 header length below minimum");
    }
    if payload.len() < ip_header_len {
        return Err("IPv4 header length exceeds payload size");
    }

    // Total length 0 shows up on segmentation-offloaded frames; trust the capture then.
    let total_len = u16::from_be_bytes([payload[2], payload[3]]) as usize;
    let end = if total_len == 0 { payload.len() } else { total_len.min(payload.len()) };
    if end < ip_header_len {
        return Err("IPv4 total length below header length");
    }

    let src = Ipv4Addr::new(payload[12], payload[13], payload[14], payload[15]);
    let dst = Ipv4Addr::new(payload[16], payload[17], payload[18], payload[19]);
    let protocol = payload[9];
    let flags_offset = u16::from_be_bytes([payload[6], payload[7]]);
    let more_fragments = flags_offset & MORE_FRAGMENTS != 0;
    let fragment_offset = flags_offset & 0x1FFF;

    layers.push(Layer::Ipv4(Ipv4Header {
        src,
        dst,
        protocol,
        ttl: payload[8],
        more_fragments,
        fragment_offset,
        header_len: ip_header_len,
    }));

    // Fragments are not reassembled, so none of them yields a transport layer
    if more_fragments || fragment_offset != 0 {
        return Ok(());
    }

    super::dispatch_ip_protocol(protocol, &payload[ip_header_len..end], layers)
}
