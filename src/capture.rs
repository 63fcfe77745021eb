use std::path::Path;

use pcap::{Activated, Active, Capture, Dead, Linktype, Packet, Savefile};
use tracing::{debug, info};

use crate::config::{PROMISCUOUS, READ_TIMEOUT_MS, SNAPSHOT_LEN};
use crate::error::{Result, SniffError};

/// Anything the receive loop can pull frames from.
pub trait PacketSource {
    /// Waits for the next frame.
    ///
    /// `Ok(None)` means the read timed out without a frame. The backend's
    /// `NoMorePackets` error signals that the source is closed.
    fn recv(&mut self) -> std::result::Result<Option<Packet<'_>>, pcap::Error>;

    /// Link layer every frame from this source starts with.
    fn linktype(&self) -> Linktype;
}

impl<T: Activated + ?Sized> PacketSource for Capture<T> {
    fn linktype(&self) -> Linktype {
        self.get_datalink()
    }

    fn recv(&mut self) -> std::result::Result<Option<Packet<'_>>, pcap::Error> {
        match self.next_packet() {
            Ok(packet) => Ok(Some(packet)),
            Err(pcap::Error::TimeoutExpired) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Persistent destination captured frames are mirrored to.
pub trait PacketSink {
    fn write_packet(&mut self, packet: &Packet<'_>) -> Result<()>;
}

/// A pcap file with an Ethernet link type and a 65535-byte snapshot length.
/// The file is flushed and closed when this is dropped.
pub struct CaptureFile {
    savefile: Savefile,
    _handle: Capture<Dead>,
}

impl CaptureFile {
    /// Creates the file and writes the global header.
    pub fn create(path: &Path) -> Result<Self> {
        let sink_err = |source| SniffError::Sink {
            path: path.to_path_buf(),
            source,
        };
        // pcap_open_dead fixes the snapshot length at 65535
        let handle = Capture::dead(Linktype::ETHERNET).map_err(sink_err)?;
        let savefile = handle.savefile(path).map_err(sink_err)?;
        info!("Writing packets to {}", path.display());
        Ok(CaptureFile {
            savefile,
            _handle: handle,
        })
    }
}

impl PacketSink for CaptureFile {
    fn write_packet(&mut self, packet: &Packet<'_>) -> Result<()> {
        self.savefile.write(packet);
        Ok(())
    }
}

/// Opens a device for live capture: full snapshot length, non-promiscuous.
pub fn open_device_capture(device: &str) -> Result<Capture<Active>> {
    let open_err = |source| SniffError::DeviceOpen {
        device: device.to_string(),
        source,
    };
    let cap = Capture::from_device(device)
        .map_err(open_err)?
        .snaplen(SNAPSHOT_LEN)
        .promisc(PROMISCUOUS)
        .timeout(READ_TIMEOUT_MS)
        .open()
        .map_err(open_err)?;
    debug!("Opened {} with link type {:?}", device, cap.get_datalink());
    Ok(cap)
} // open_device_capture

/// Compiles and installs a BPF filter on an open capture.
pub fn apply_bpf_filter(cap: &mut Capture<Active>, filter: &str) -> Result<()> {
    cap.filter(filter, true).map_err(|source| SniffError::Filter {
        filter: filter.to_string(),
        source,
    })?;
    info!("Filter applied: {}", filter);
    Ok(())
} // apply_bpf_filter
