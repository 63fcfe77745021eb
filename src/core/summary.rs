use std::collections::BTreeMap;

use tracing::info;

use crate::classify::Classification;
use crate::core::runner::CaptureReport;

const UNCLASSIFIED: &str = "(unclassified)";

/// Packets seen per printed protocol label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketCounts(BTreeMap<String, usize>);

impl PacketCounts {
    pub fn record(&mut self, info: &Classification) {
        let label = match info.protocol {
            Some(p) => p.to_string(),
            None => UNCLASSIFIED.to_string(),
        };
        *self.0.entry(label).or_insert(0) += 1;
    }

    pub fn get(&self, label: &str) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Logs a summary of captured packets by type.
pub fn print_packet_summary(report: &CaptureReport) {
    info!("Packet summary ({:?}):", report.termination);

    if report.counts.is_empty() {
        info!("  No packets captured");
    } else {
        for (label, count) in report.counts.iter() {
            info!("  {}: {}", label, count);
        }
    }
}
