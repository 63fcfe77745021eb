//! Turns a captured frame into a protocol label and an endpoint pair.
//!
//! Classification runs a fixed list of rules in order. Each rule looks for one
//! layer and, if it is present, unconditionally writes the fields it owns, so a
//! later rule overwrites whatever an earlier one set. The order is part of the
//! output format and must not be rearranged.

use chrono::{DateTime, Local, TimeZone, Utc};
use pcap::Linktype;
use std::fmt;

use crate::packet::{Layers, decode};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy)]
pub enum Protocol {
    Eth,
    Udp,
    Tcp,
    Arp,
    Icmp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Eth => write!(f, "ETH"),
            Protocol::Udp => write!(f, "UDP"),
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Arp => write!(f, "ARP"),
            Protocol::Icmp => write!(f, "ICMP"),
        }
    }
}

/// One classified frame. Any field may be empty; classification never fails.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classification {
    pub protocol: Option<Protocol>,
    pub src: String,
    pub dst: String,
    pub src_port: String,
    pub dst_port: String,
    pub timestamp: String,
    pub length: u32,
}

impl Classification {
    /// Label as printed; empty when no rule matched.
    pub fn label(&self) -> String {
        self.protocol.map(|p| p.to_string()).unwrap_or_default()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let proto = self.label();
        if !self.src_port.is_empty() {
            write!(
                f,
                "{} {} {}:{} --> {}:{} (len:{})",
                self.timestamp, proto, self.src, self.src_port, self.dst, self.dst_port, self.length
            )
        } else {
            write!(
                f,
                "{} {} {} --> {} (len:{})",
                self.timestamp, proto, self.src, self.dst, self.length
            )
        }
    }
}

type Rule = fn(&Layers, &mut Classification);

const RULES: [Rule; 8] = [
    ipv6_addresses,
    ipv4_addresses,
    ethernet_addresses,
    udp_ports,
    tcp_ports,
    arp_label,
    icmpv4_label,
    icmpv6_label,
];

fn ipv6_addresses(layers: &Layers, c: &mut Classification) {
    if let Some(ip) = layers.ipv6() {
        c.src = ip.src.to_string();
        c.dst = ip.dst.to_string();
    }
}

fn ipv4_addresses(layers: &Layers, c: &mut Classification) {
    if let Some(ip) = layers.ipv4() {
        c.src = ip.src.to_string();
        c.dst = ip.dst.to_string();
    }
}

/// Layer 2 only frame: fall back to the hardware addresses.
fn ethernet_addresses(layers: &Layers, c: &mut Classification) {
    if !c.src.is_empty() {
        return;
    }
    if let Some(eth) = layers.ethernet() {
        c.src = eth.src.to_string();
        c.dst = eth.dst.to_string();
        c.protocol = Some(Protocol::Eth);
    }
}

fn udp_ports(layers: &Layers, c: &mut Classification) {
    if let Some(udp) = layers.udp() {
        c.src_port = udp.src_port.to_string();
        c.dst_port = udp.dst_port.to_string();
        c.protocol = Some(Protocol::Udp);
    }
}

fn tcp_ports(layers: &Layers, c: &mut Classification) {
    if let Some(tcp) = layers.tcp() {
        c.src_port = tcp.src_port.to_string();
        c.dst_port = tcp.dst_port.to_string();
        c.protocol = Some(Protocol::Tcp);
    }
}

/// Endpoints set by earlier rules are kept.
fn arp_label(layers: &Layers, c: &mut Classification) {
    if layers.arp().is_some() {
        c.protocol = Some(Protocol::Arp);
    }
}

fn icmpv4_label(layers: &Layers, c: &mut Classification) {
    if layers.icmpv4().is_some() {
        c.protocol = Some(Protocol::Icmp);
    }
}

/// KNOWN DEFECT: this rule tests for an ICMPv4 layer, not ICMPv6, so ICMPv6
/// frames keep whatever label the earlier rules produced. The printed output
/// of existing captures depends on it; leave it until ICMPv6 labelling is
/// actually wanted, then switch the lookup to `layers.icmpv6()`.
fn icmpv6_label(layers: &Layers, c: &mut Classification) {
    if layers.icmpv4().is_some() {
        c.protocol = Some(Protocol::Icmp);
    }
}

/// Classify a decoded frame.
pub fn classify_layers(layers: &Layers, timestamp: String, length: u32) -> Classification {
    let mut c = Classification {
        timestamp,
        length,
        ..Default::default()
    };
    for rule in RULES {
        rule(layers, &mut c);
    }
    c
}

/// Decode and classify one packet captured on a device of the given link type.
pub fn classify(linktype: Linktype, packet: &pcap::Packet<'_>) -> Classification {
    let layers = decode(linktype, packet.data);
    let header = packet.header;
    let timestamp = format_timestamp(header.ts.tv_sec as i64, header.ts.tv_usec as i64, &Local);
    classify_layers(&layers, timestamp, header.len)
}

/// Render a capture time as `YYYY/MM/DD HH:MM:SS` in the given zone.
/// Out-of-range times render as an empty string.
pub fn format_timestamp<Tz>(secs: i64, micros: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let nanos = (micros.clamp(0, 999_999) * 1_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|utc| utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}
