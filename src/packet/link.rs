//! Non-Ethernet link layers: Linux cooked capture, raw IP and BSD loopback.

use super::Layers;

const LINUX_SLL_HEADER_LEN: usize = 16;
const LINUX_SLL2_HEADER_LEN: usize = 20;
const LOOPBACK_HEADER_LEN: usize = 4;

const AF_INET: u32 = 2;
/// AF_INET6 differs per OS: Linux, NetBSD/OpenBSD, FreeBSD, Darwin.
const AF_INET6: [u32; 4] = [10, 24, 28, 30];

/// `any` device on Linux (SLL v1). The protocol field is an EtherType.
pub fn parse_linux_sll(data: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    if data.len() < LINUX_SLL_HEADER_LEN {
        return Err("Packet too short for Linux SLL header");
    }
    let protocol = u16::from_be_bytes([data[14], data[15]]);
    super::dispatch_ethertype(protocol, &data[LINUX_SLL_HEADER_LEN..], layers)
}

/// SLL v2 moves the protocol to the front and adds an interface index.
pub fn parse_linux_sll2(data: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    if data.len() < LINUX_SLL2_HEADER_LEN {
        return Err("Packet too short for Linux SLL2 header");
    }
    let protocol = u16::from_be_bytes([data[0], data[1]]);
    super::dispatch_ethertype(protocol, &data[LINUX_SLL2_HEADER_LEN..], layers)
}

/// Bare IP datagram; the version nibble picks the parser.
pub fn parse_raw_ip(data: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    match data.first().map(|b| b >> 4) {
        Some(4) => super::ipv4::parse_ipv4(data, layers),
        Some(6) => super::ipv6::parse_ipv6(data, layers),
        Some(_) => Err("Raw packet is neither IPv4 nor IPv6"),
        None => Err("Empty raw packet"),
    }
}

/// 4-byte address family header of DLT_NULL / DLT_LOOP.
///
/// The family is in the capturing host's byte order for NULL and big-endian
/// for LOOP. Families are small, so two leading zero bytes mean big-endian.
pub fn parse_loopback(data: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    if data.len() < LOOPBACK_HEADER_LEN {
        return Err("Packet too short for loopback header");
    }
    let raw = [data[0], data[1], data[2], data[3]];
    let family = if raw[0] == 0 && raw[1] == 0 {
        u32::from_be_bytes(raw)
    } else {
        u32::from_le_bytes(raw)
    };

    let payload = &data[LOOPBACK_HEADER_LEN..];
    if family == AF_INET {
        super::ipv4::parse_ipv4(payload, layers)
    } else if AF_INET6.contains(&family) {
        super::ipv6::parse_ipv6(payload, layers)
    } else {
        Err("Unknown loopback address family")
    }
}
