mod arp;
mod ethernet;
mod icmp;
mod ipv4;
mod ipv6;
mod link;
mod tcp;
mod udp;

pub use arp::ArpHeader;
pub use ethernet::{EthernetHeader, MacAddr};
pub use icmp::IcmpHeader;
pub use ipv4::Ipv4Header;
pub use ipv6::Ipv6Header;
pub use tcp::{TcpFlags, TcpHeader};
pub use udp::UdpHeader;

use pcap::Linktype;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_VLAN: u16 = 0x8100;
pub const ETHERTYPE_QINQ: u16 = 0x88A8;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;

pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_IPIP: u8 = 4;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;
pub const IPPROTO_IPV6: u8 = 41;
pub const IPPROTO_ICMPV6: u8 = 58;

/// Tunnels deeper than this are left undecoded.
const MAX_NETWORK_LAYERS: usize = 8;

/// One decoded protocol header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Ethernet(EthernetHeader),
    Arp(ArpHeader),
    Ipv4(Ipv4Header),
    Ipv6(Ipv6Header),
    Tcp(TcpHeader),
    Udp(UdpHeader),
    Icmpv4(IcmpHeader),
    Icmpv6(IcmpHeader),
}

/// The headers found in a frame, outermost first.
///
/// Lookups return the first layer of the requested kind, so an IPv6 packet
/// tunnelled inside IPv4 reports both an IPv4 and an IPv6 layer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Layers {
    layers: Vec<Layer>,
    truncated: Option<&'static str>,
}

impl Layers {
    /// Why decoding stopped early, if it did.
    pub fn truncated(&self) -> Option<&'static str> {
        self.truncated
    }

    pub fn ethernet(&self) -> Option<&EthernetHeader> {
        self.layers.iter().find_map(|l| match l {
            Layer::Ethernet(h) => Some(h),
            _ => None,
        })
    }

    pub fn arp(&self) -> Option<&ArpHeader> {
        self.layers.iter().find_map(|l| match l {
            Layer::Arp(h) => Some(h),
            _ => None,
        })
    }

    pub fn ipv4(&self) -> Option<&Ipv4Header> {
        self.layers.iter().find_map(|l| match l {
            Layer::Ipv4(h) => Some(h),
            _ => None,
        })
    }

    pub fn ipv6(&self) -> Option<&Ipv6Header> {
        self.layers.iter().find_map(|l| match l {
            Layer::Ipv6(h) => Some(h),
            _ => None,
        })
    }

    pub fn tcp(&self) -> Option<&TcpHeader> {
        self.layers.iter().find_map(|l| match l {
            Layer::Tcp(h) => Some(h),
            _ => None,
        })
    }

    pub fn udp(&self) -> Option<&UdpHeader> {
        self.layers.iter().find_map(|l| match l {
            Layer::Udp(h) => Some(h),
            _ => None,
        })
    }

    pub fn icmpv4(&self) -> Option<&IcmpHeader> {
        self.layers.iter().find_map(|l| match l {
            Layer::Icmpv4(h) => Some(h),
            _ => None,
        })
    }

    pub fn icmpv6(&self) -> Option<&IcmpHeader> {
        self.layers.iter().find_map(|l| match l {
            Layer::Icmpv6(h) => Some(h),
            _ => None,
        })
    }

    fn len(&self) -> usize {
        self.layers.len()
    }

    fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    fn network_depth(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l, Layer::Ipv4(_) | Layer::Ipv6(_)))
            .count()
    }
}

/// DLT_RAW as some platforms number it instead of LINKTYPE_RAW.
const DLT_RAW_ALIASES: [Linktype; 2] = [Linktype(12), Linktype(14)];

/// Decode a frame captured on a device of the given link type into its layers.
///
/// Never fails: a malformed header or an unsupported link type ends decoding
/// and the layers found up to that point are returned, with the reason
/// available through [`Layers::truncated`].
pub fn decode(linktype: Linktype, data: &[u8]) -> Layers {
    let mut layers = Layers::default();
    let result = match linktype {
        Linktype::ETHERNET => ethernet::parse_ethernet(data, &mut layers),
        Linktype::LINUX_SLL => link::parse_linux_sll(data, &mut layers),
        Linktype::LINUX_SLL2 => link::parse_linux_sll2(data, &mut layers),
        Linktype::RAW => link::parse_raw_ip(data, &mut layers),
        Linktype::IPV4 => ipv4::parse_ipv4(data, &mut layers),
        Linktype::IPV6 => ipv6::parse_ipv6(data, &mut layers),
        Linktype::NULL | Linktype::LOOP => link::parse_loopback(data, &mut layers),
        other if DLT_RAW_ALIASES.contains(&other) => link::parse_raw_ip(data, &mut layers),
        _ => Err("Unsupported link type"),
    };
    if let Err(reason) = result {
        tracing::trace!("decoding stopped after {} layers: {}", layers.len(), reason);
        layers.truncated = Some(reason);
    }
    layers
}

fn dispatch_ethertype(ethertype: u16, payload: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    match ethertype {
        ETHERTYPE_IPV4 => ipv4::parse_ipv4(payload, layers),
        ETHERTYPE_IPV6 => ipv6::parse_ipv6(payload, layers),
        ETHERTYPE_ARP => arp::parse_arp(payload, layers),
        _ => Ok(()),
    }
}

fn dispatch_ip_protocol(protocol: u8, payload: &[u8], layers: &mut Layers) -> Result<(), &'static str> {
    match protocol {
        IPPROTO_TCP => tcp::parse_tcp(payload, layers),
        IPPROTO_UDP => udp::parse_udp(payload, layers),
        IPPROTO_ICMP => icmp::parse_icmpv4(payload, layers),
        IPPROTO_ICMPV6 => icmp::parse_icmpv6(payload, layers),
        IPPROTO_IPIP | IPPROTO_IPV6 if layers.network_depth() >= MAX_NETWORK_LAYERS => {
            Err("Too many nested IP headers")
        }
        IPPROTO_IPIP => ipv4::parse_ipv4(payload, layers),
        IPPROTO_IPV6 => ipv6::parse_ipv6(payload, layers),
        _ => Ok(()),
    }
}
