// src/ui/device.rs
use std::io::{self, Write};

use crate::interfaces::Inventory;

/// Prints every interface that has at least one address. Interfaces without
/// addresses stay selectable with `-i`, they are just not listed.
pub fn print_device_list<W: Write>(inventory: &Inventory, out: &mut W) -> io::Result<()> {
    for dev in inventory.iter().filter(|d| !d.addresses.is_empty()) {
        writeln!(out, "ID: {}", dev.id)?;
        writeln!(out, "Name: {}", dev.name)?;
        if let Some(desc) = &dev.description {
            writeln!(out, "Description: {}", desc)?;
        }
        let mac = dev.mac.map(|m| m.to_string()).unwrap_or_default();
        writeln!(out, "MAC: {}", mac)?;
        writeln!(out, "Devices addresses: ")?;
        for address in &dev.addresses {
            writeln!(out, "\tIP address: {}", address.ip)?;
            let mask = address.netmask.map(|m| m.to_string()).unwrap_or_default();
            writeln!(out, "\tSubnet mask: {}", mask)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
