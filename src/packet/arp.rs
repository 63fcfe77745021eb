use super::{Layer, Layers};

/// ARP header with variable-length addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpHeader {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub operation: u16,
    pub sender_hw: Vec<u8>,
    pub sender_proto: Vec<u8>,
    pub target_hw: Vec<u8>,
    pub target_proto: Vec<u8>,
}

pub fn parse_arp(payload: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    if payload.len() < 8 {
        return Err("ARP header too short");
    }

    let hw_len = payload[4] as usize;
    let proto_len = payload[5] as usize;
    let needed = 8 + 2 * (hw_len + proto_len);
    if payload.len() < needed {
        return Err("ARP addresses exceed payload size");
    }

    let mut pos = 8;
    let mut take = |len: usize| {
        let field = payload[pos..pos + len].to_vec();
        pos += len;
        field
    };

    let sender_hw = take(hw_len);
    let sender_proto = take(proto_len);
    let target_hw = take(hw_len);
    let target_proto = take(proto_len);

    layers.push(Layer::Arp(ArpHeader {
        hardware_type: u16::from_be_bytes([payload[0], payload[1]]),
        protocol_type: u16::from_be_bytes([payload[2], payload[3]]),
        operation: u16::from_be_bytes([payload[6], payload[7]]),
        sender_hw,
        sender_proto,
        target_hw,
        target_proto,
    }));

    Ok(())
}
