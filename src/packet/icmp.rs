use super::{Layer, Layers};

/// Type and code of an ICMP or ICMPv6 message. The rest is not decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
}

fn parse_icmp_header(header: &[u8]) -> Result<IcmpHeader, &'static str> {
    if header.len() < 4 {
        return Err("ICMP header too short");
    }
    Ok(IcmpHeader {
        icmp_type: header[0],
        code: header[1],
    })
}

pub fn parse_icmpv4(payload: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    layers.push(Layer::Icmpv4(parse_icmp_header(payload)?));
    Ok(())
}

pub fn parse_icmpv6(payload: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    layers.push(Layer::Icmpv6(parse_icmp_header(payload)?));
    Ok(())
}
