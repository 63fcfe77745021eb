use std::{
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::{debug, info};

use crate::capture::{PacketSink, PacketSource};
use crate::classify::classify;
use crate::config::SessionConfig;
use crate::core::summary::PacketCounts;
use crate::error::{Result, SniffError};

/// Why a receive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The configured packet limit was reached.
    LimitReached,
    /// The running flag was cleared, normally by Ctrl+C.
    Interrupted,
    /// The source has no more packets (handle closed or end of file).
    SourceClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub packets: usize,
    pub termination: Termination,
    pub counts: PacketCounts,
}

/// Receives, classifies, prints, and optionally persists packets until the
/// limit is reached, the source closes, or `running` is cleared.
///
/// The counter is bumped as soon as a frame arrives and compared against the
/// limit only after the frame has been printed and written.
pub fn run_packet_loop<S, W>(
    config: &SessionConfig,
    running: &AtomicBool,
    source: &mut S,
    mut sink: Option<&mut dyn PacketSink>,
    out: &mut W,
) -> Result<CaptureReport>
where
    S: PacketSource + ?Sized,
    W: Write,
{
    let mut packets = 0usize;
    let mut counts = PacketCounts::default();
    let linktype = source.linktype();

    let termination = loop {
        if !running.load(Ordering::SeqCst) {
            info!("Capture interrupted after {} packets", packets);
            break Termination::Interrupted;
        }

        let packet = match source.recv() {
            Ok(Some(packet)) => packet,
            Ok(None) => continue,
            Err(pcap::Error::NoMorePackets) => {
                debug!("Packet source closed");
                break Termination::SourceClosed;
            }
            Err(e) => return Err(SniffError::Receive(e)),
        };

        packets += 1;

        let info = classify(linktype, &packet);
        writeln!(out, "{}", info)?;
        counts.record(&info);

        if let Some(sink) = sink.as_deref_mut() {
            sink.write_packet(&packet)?;
        }

        if config.limit_reached(packets) {
            info!("Done capturing {} packets", packets);
            break Termination::LimitReached;
        }
    };

    out.flush()?;

    Ok(CaptureReport {
        packets,
        termination,
        counts,
    })
}

/// In-memory sources and sinks for driving the loop without a device.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use pcap::{Linktype, Packet, PacketHeader};

    use crate::capture::{PacketSink, PacketSource};
    use crate::error::Result;

    pub enum Event {
        Frame(PacketHeader, Vec<u8>),
        Timeout,
        Fail,
    }

    /// Replays queued events, then reports `NoMorePackets`.
    pub struct Replay {
        events: VecDeque<Event>,
        current: Option<(PacketHeader, Vec<u8>)>,
        linktype: Linktype,
        pub reads: usize,
    }

    impl Default for Replay {
        fn default() -> Self {
            Replay {
                events: VecDeque::new(),
                current: None,
                linktype: Linktype::ETHERNET,
                reads: 0,
            }
        }
    }

    impl Replay {
        pub fn with_linktype(mut self, linktype: Linktype) -> Self {
            self.linktype = linktype;
            self
        }

        pub fn frames(count: usize, frame: &[u8]) -> Self {
            let mut replay = Replay::default();
            for i in 0..count {
                replay.push_frame(1_700_000_000 + i as i64, frame.to_vec());
            }
            replay
        }

        pub fn push_frame(&mut self, sec: i64, data: Vec<u8>) {
            let header = PacketHeader {
                ts: libc::timeval {
                    tv_sec: sec as _,
                    tv_usec: 0,
                },
                caplen: data.len() as u32,
                len: data.len() as u32,
            };
            self.events.push_back(Event::Frame(header, data));
        }

        pub fn push(&mut self, event: Event) {
            self.events.push_back(event);
        }
    }

    impl PacketSource for Replay {
        fn linktype(&self) -> Linktype {
            self.linktype
        }

        fn recv(&mut self) -> std::result::Result<Option<Packet<'_>>, pcap::Error> {
            self.reads += 1;
            match self.events.pop_front() {
                Some(Event::Frame(header, data)) => {
                    let (header, data) = self.current.insert((header, data));
                    Ok(Some(Packet::new(header, data)))
                }
                Some(Event::Timeout) => Ok(None),
                Some(Event::Fail) => Err(pcap::Error::PcapError("interface went down".into())),
                None => Err(pcap::Error::NoMorePackets),
            }
        }
    }

    /// Records what it was asked to persist.
    #[derive(Default)]
    pub struct MemorySink {
        pub written: Vec<Vec<u8>>,
    }

    impl PacketSink for MemorySink {
        fn write_packet(&mut self, packet: &Packet<'_>) -> Result<()> {
            self.written.push(packet.data.to_vec());
            Ok(())
        }
    }
}
