//! Capture-capable interfaces as reported by libpcap, with hardware addresses
//! taken from the OS interface list.

use std::net::IpAddr;

use pcap::Device;
use pnet_datalink::NetworkInterface;
use tracing::debug;

use crate::error::{Result, SniffError};
use crate::packet::MacAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub ip: IpAddr,
    pub netmask: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// 1-based position in enumeration order.
    pub id: usize,
    pub name: String,
    pub description: Option<String>,
    pub mac: Option<MacAddr>,
    pub addresses: Vec<InterfaceAddress>,
}

/// Interfaces in the order the OS reported them. Built fresh on every call to
/// [`Inventory::enumerate`].
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    interfaces: Vec<Interface>,
}

impl Inventory {
    /// Lists every capture device and resolves its hardware address.
    pub fn enumerate() -> Result<Self> {
        let devices = Device::list().map_err(SniffError::Enumeration)?;
        let links = pnet_datalink::interfaces();
        debug!("libpcap reported {} devices, OS reported {} links", devices.len(), links.len());

        let mut inventory = Inventory::default();
        for device in devices {
            let mac = hardware_address(&device.name, &links);
            let addresses = device
                .addresses
                .iter()
                .map(|a| InterfaceAddress {
                    ip: a.addr,
                    netmask: a.netmask,
                })
                .collect();
            inventory.push(device.name, device.desc, mac, addresses);
        }
        Ok(inventory)
    }

    /// Appends an interface, assigning the next ordinal.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        mac: Option<MacAddr>,
        addresses: Vec<InterfaceAddress>,
    ) -> &Interface {
        let id = self.interfaces.len() + 1;
        self.interfaces.push(Interface {
            id,
            name: name.into(),
            description,
            mac,
            addresses,
        });
        &self.interfaces[id - 1]
    }

    /// Finds an interface by name, or failing that by its ordinal written in
    /// decimal. Names are searched before ordinals, so an interface literally
    /// named "2" is preferred over the second interface.
    pub fn resolve(&self, query: &str) -> Result<&Interface> {
        self.interfaces
            .iter()
            .find(|i| i.name == query)
            .or_else(|| self.interfaces.iter().find(|i| i.id.to_string() == query))
            .ok_or_else(|| SniffError::NotFound(query.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.iter()
    }
}

fn hardware_address(name: &str, links: &[NetworkInterface]) -> Option<MacAddr> {
    links
        .iter()
        .find(|link| link.name == name)
        .and_then(|link| link.mac)
        .map(|mac| MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addr(ip: [u8; 4]) -> InterfaceAddress {
        InterfaceAddress {
            ip: IpAddr::V4(Ipv4Addr::from(ip)),
            netmask: Some(IpAddr::V4(Ipv4Addr::new(255, 255, 255, 0))),
        }
    }

    fn sample() -> Inventory {
        let mut inventory = Inventory::default();
        inventory.push("eth0", None, Some(MacAddr([2, 0, 0, 0, 0, 1])), vec![addr([10, 0, 0, 1])]);
        inventory.push("any", Some("Pseudo-device".into()), None, vec![]);
        inventory.push("1", None, None, vec![addr([10, 0, 1, 1])]);
        inventory.push("lo", None, None, vec![addr([127, 0, 0, 1])]);
        inventory
    }

    #[test]
    fn ordinals_follow_enumeration_order() {
        let ids: Vec<_> = sample().iter().map(|i| (i.id, i.name.clone())).collect();
        assert_eq!(
            ids,
            vec![(1, "eth0".into()), (2, "any".into()), (3, "1".into()), (4, "lo".into())]
        );
    }

    #[test]
    fn resolves_by_name_or_ordinal() {
        let inventory = sample();
        assert_eq!(inventory.resolve("lo").unwrap().id, 4);
        assert_eq!(inventory.resolve("2").unwrap().name, "any");
        assert_eq!(inventory.resolve("any").unwrap().id, 2);
    }

    #[test]
    fn name_match_beats_ordinal_match() {
        let inventory = sample();
        let found = inventory.resolve("1").unwrap();
        assert_eq!(found.id, 3);
        assert_eq!(found.name, "1");
    }

    #[test]
    fn ordinal_must_match_exactly() {
        let inventory = sample();
        assert!(matches!(inventory.resolve("04"), Err(SniffError::NotFound(q)) if q == "04"));
        assert!(inventory.resolve("5").is_err());
        assert!(inventory.resolve("").is_err());
    }
}
