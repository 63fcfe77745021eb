use crate::packet::{Layer, Layers};
use std::net::Ipv6Addr;

const HOP_BY_HOP: u8 = 0;
const ROUTING: u8 = 43;
const FRAGMENT: u8 = 44;
const DESTINATION_OPTIONS: u8 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Header {
    pub src: Ipv6Addr,
    pub dst: Ipv6Addr,
    pub next_header: u8,
    pub hop_limit: u8,
}

pub fn parse_ipv6(payload: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    if payload.len() < 40 {
        return Err("IPv6 header too short");
    }
    if payload[0] >> 4 != 6 {
        return Err("IPv6 version field mismatch");
    }

    let mut src = [0u8; 16];
    src.copy_from_slice(&payload[8..24]);
    let mut dst = [0u8; 16];
    dst.copy_from_slice(&payload[24..40]);

    let payload_len = u16::from_be_bytes([payload[4], payload[5]]) as usize;
    // Zero payload length means a jumbogram; use what was captured
    let end = if payload_len == 0 { payload.len() } else { (40 + payload_len).min(payload.len()) };

    let mut next_header = payload[6];
    layers.push(Layer::Ipv6(Ipv6Header {
        src: Ipv6Addr::from(src),
        dst: Ipv6Addr::from(dst),
        next_header,
        hop_limit: payload[7],
    }));

    let mut offset = 40;
    loop {
        match next_header {
            HOP_BY_HOP | ROUTING | DESTINATION_OPTIONS => {
                if end < offset + 8 {
                    return Err("IPv6 extension header truncated");
                }
                let ext_len = (payload[offset + 1] as usize + 1) * 8;
                if end < offset + ext_len {
                    return Err("IPv6 extension header exceeds payload size");
                }
                next_header = payload[offset];
                offset += ext_len;
            }
            // Fragments are not reassembled, so decoding ends here
            FRAGMENT => {
                if end < offset + 8 {
                    return Err("IPv6 fragment header truncated");
                }
                return Ok(());
            }
            _ => break,
        }
    }

    super::dispatch_ip_protocol(next_header, &payload[offset..end], layers)
}

#[cfg(test)]
mod tests {
    use crate::packet::{ETHERTYPE_IPV6, IPPROTO_TCP, IPPROTO_UDP, decode, testing};
    use pcap::Linktype;

    #[test]
    fn skips_hop_by_hop_options() {
        let mut body = vec![IPPROTO_TCP, 0, 0x05, 0x02, 0x00, 0x00, 0x01, 0x00];
        body.extend_from_slice(&testing::tcp(22, 61000, 0x18));
        let packet = testing::ipv6("fe80::1".parse().unwrap(), "fe80::2".parse().unwrap(), 0, &body);
        let layers = decode(Linktype::ETHERNET, &testing::ethernet(ETHERTYPE_IPV6, &packet));

        assert_eq!(layers.ipv6().map(|h| h.next_header), Some(0));
        let tcp = layers.tcp().expect("tcp layer");
        assert_eq!((tcp.src_port, tcp.dst_port), (22, 61000));
        assert!(tcp.flags.psh && tcp.flags.ack);
    }

    #[test]
    fn short_header_is_reported() {
        let layers = decode(Linktype::ETHERNET, &testing::ethernet(ETHERTYPE_IPV6, &[0x60; 20]));
        assert!(layers.ipv6().is_none());
        assert_eq!(layers.truncated(), Some("IPv6 header too short"));
    }

    #[test]
    fn fragment_header_ends_decoding() {
        // first fragment: offset 0, M flag set
        let mut body = vec![IPPROTO_UDP, 0, 0x00, 0x01, 0x00, 0x00, 0x30, 0x39];
        body.extend_from_slice(&testing::udp(5000, 53, &[0u8; 16]));
        let packet = testing::ipv6("2001:db8::1".parse().unwrap(), "2001:db8::2".parse().unwrap(), 44, &body);
        let layers = decode(Linktype::ETHERNET, &testing::ethernet(ETHERTYPE_IPV6, &packet));

        assert_eq!(layers.ipv6().map(|h| h.next_header), Some(44));
        assert!(layers.udp().is_none());
        assert!(layers.truncated().is_none());
    }
}
