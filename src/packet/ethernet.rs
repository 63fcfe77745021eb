use super::{ETHERTYPE_QINQ, ETHERTYPE_VLAN, Layer, Layers};
use std::fmt;

/// A 6-byte hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetHeader {
    pub src: MacAddr,
    pub dst: MacAddr,
    pub ethertype: u16,
}

/// Entry point for parsing Ethernet-based packets.
pub fn parse_ethernet(data: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    if data.len() < 14 {
        return Err("Packet too short for Ethernet header");
    }

    let ethertype = u16::from_be_bytes([data[12], data[13]]);
    layers.push(Layer::Ethernet(EthernetHeader {
        src: mac_from_slice(&data[6..12]),
        dst: mac_from_slice(&data[0..6]),
        ethertype,
    }));

    // 802.1Q / 802.1ad tags: 2 bytes TCI then the inner EtherType
    let mut inner = ethertype;
    let mut offset = 14;
    while inner == ETHERTYPE_VLAN || inner == ETHERTYPE_QINQ {
        if data.len() < offset + 4 {
            return Err("Packet too short for VLAN tag");
        }
        inner = u16::from_be_bytes([data[offset + 2], data[offset + 3]]);
        offset += 4;
    }

    super::dispatch_ethertype(inner, &data[offset..], layers)
}

/// Utility: turn a 6-byte slice into a MAC address
fn mac_from_slice(slice: &[u8]) -> MacAddr {
    let mut arr = [0u8; 6];
    arr.copy_from_slice(slice);
    MacAddr(arr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_display_is_lowercase_colon_separated() {
        let mac = MacAddr([0x00, 0x1B, 0x21, 0x3A, 0x4F, 0x0c]);
        assert_eq!(mac.to_string(), "00:1b:21:3a:4f:0c");
    }
}
