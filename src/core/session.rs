use std::{
    io::{self, Write},
    sync::{atomic::AtomicBool, Arc},
};

use tracing::info;

use crate::capture::{apply_bpf_filter, open_device_capture, CaptureFile, PacketSink, PacketSource};
use crate::config::{SessionConfig, SNAPSHOT_LEN};
use crate::core::runner::{run_packet_loop, CaptureReport, Termination};
use crate::error::{Result, SniffError};
use crate::interfaces::Interface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No device bound yet.
    Idle,
    /// Device selected; nothing opened.
    Configured,
    Running,
    /// `None` when setup or the receive loop failed.
    Terminated(Option<Termination>),
}

/// A single capture from one interface.
///
/// The capture handle and the optional capture file live only inside
/// [`CaptureSession::start`] and are closed on every return path when they go
/// out of scope.
pub struct CaptureSession {
    config: SessionConfig,
    running: Arc<AtomicBool>,
    state: SessionState,
    device: Option<Interface>,
}

impl CaptureSession {
    pub fn new(config: SessionConfig, running: Arc<AtomicBool>) -> Self {
        CaptureSession {
            config,
            running,
            state: SessionState::Idle,
            device: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn device(&self) -> Option<&Interface> {
        self.device.as_ref()
    }

    /// Selects the interface to capture on. Idle → Configured.
    pub fn bind(&mut self, device: Interface) -> Result<()> {
        self.expect_state(SessionState::Idle, "idle")?;
        self.device = Some(device);
        self.state = SessionState::Configured;
        Ok(())
    }

    /// Opens the capture file (if any), then the device, installs the filter,
    /// and prints packets to stdout until the session terminates.
    pub fn start(&mut self) -> Result<CaptureReport> {
        self.expect_state(SessionState::Configured, "configured")?;
        self.state = SessionState::Running;
        let outcome = self.capture_live();
        self.finish(outcome)
    }

    /// Runs the session against an already open source instead of the bound
    /// device. The capture file, limit, and cancellation behave as in
    /// [`CaptureSession::start`]; the filter is left to whoever built the source.
    pub fn run_source<S, W>(&mut self, source: &mut S, out: &mut W) -> Result<CaptureReport>
    where
        S: PacketSource + ?Sized,
        W: Write,
    {
        self.expect_state(SessionState::Configured, "configured")?;
        self.state = SessionState::Running;
        let outcome = self
            .open_sink()
            .and_then(|mut sink| self.drive(source, sink.as_mut(), out));
        self.finish(outcome)
    }

    fn capture_live(&self) -> Result<CaptureReport> {
        let device = match &self.device {
            Some(device) => device,
            None => return Err(self.state_error("bound to a device")),
        };

        // Header goes out before the first frame can arrive
        let mut sink = self.open_sink()?;

        let mut cap = open_device_capture(&device.name)?;
        if let Some(filter) = &self.config.filter {
            apply_bpf_filter(&mut cap, filter)?;
        }

        info!("Listening on {}, capture size {}", device.name, SNAPSHOT_LEN);
        let stdout = io::stdout();
        self.drive(&mut cap, sink.as_mut(), &mut stdout.lock())
    }

    fn open_sink(&self) -> Result<Option<CaptureFile>> {
        self.config.output.as_deref().map(CaptureFile::create).transpose()
    }

    fn drive<S, W>(&self, source: &mut S, sink: Option<&mut CaptureFile>, out: &mut W) -> Result<CaptureReport>
    where
        S: PacketSource + ?Sized,
        W: Write,
    {
        let sink = sink.map(|s| s as &mut dyn PacketSink);
        run_packet_loop(&self.config, &self.running, source, sink, out)
    }

    /// Errors are left to the caller to report.
    fn finish(&mut self, outcome: Result<CaptureReport>) -> Result<CaptureReport> {
        let termination = outcome.as_ref().ok().map(|report| report.termination);
        self.state = SessionState::Terminated(termination);
        outcome
    }

    fn expect_state(&self, wanted: SessionState, name: &'static str) -> Result<()> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(self.state_error(name))
        }
    }

    fn state_error(&self, expected: &'static str) -> SniffError {
        SniffError::InvalidState {
            actual: self.state.clone(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runner::testing::{Event, Replay};
    use crate::packet::testing::{arp_request, ethernet};
    use pcap::Capture;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    /// Collects formatted log output.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn loopback() -> Interface {
        Interface {
            id: 1,
            name: "lo".to_string(),
            description: None,
            mac: None,
            addresses: vec![],
        }
    }

    fn running() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(true))
    }

    #[test]
    fn start_requires_a_bound_device() {
        let mut session = CaptureSession::new(SessionConfig::new(), running());
        let err = session.start().unwrap_err();

        assert!(matches!(err, SniffError::InvalidState { actual: SessionState::Idle, .. }));
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn cannot_bind_twice() {
        let mut session = CaptureSession::new(SessionConfig::new(), running());
        session.bind(loopback()).unwrap();

        assert_eq!(session.state(), &SessionState::Configured);
        assert!(session.bind(loopback()).is_err());
        assert_eq!(session.device().map(|d| d.name.as_str()), Some("lo"));
    }

    #[test]
    fn limit_with_capture_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("five.pcap");
        let config = SessionConfig::new().with_limit(5).with_output(&path);
        let mut session = CaptureSession::new(config, running());
        session.bind(loopback()).unwrap();

        let frame = arp_request(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 1));
        let mut source = Replay::frames(7, &frame);
        let mut out = Vec::new();
        let report = session.run_source(&mut source, &mut out).unwrap();

        assert_eq!(report.packets, 5);
        assert_eq!(session.state(), &SessionState::Terminated(Some(Termination::LimitReached)));

        let mut reader = Capture::from_file(&path).unwrap();
        let mut stored = 0;
        while let Ok(packet) = reader.next_packet() {
            assert_eq!(packet.data, frame.as_slice());
            assert_eq!(packet.header.ts.tv_sec as i64, 1_700_000_000 + stored);
            stored += 1;
        }
        assert_eq!(stored, 5);
    }

    #[test]
    fn failure_terminates_the_session() {
        let mut session = CaptureSession::new(SessionConfig::new(), running());
        session.bind(loopback()).unwrap();

        let mut source = Replay::default();
        source.push_frame(1_700_000_000, ethernet(0x88cc, &[0u8; 46]));
        source.push(Event::Fail);
        let mut out = Vec::new();

        assert!(session.run_source(&mut source, &mut out).is_err());
        assert_eq!(session.state(), &SessionState::Terminated(None));
        assert!(session.run_source(&mut source, &mut out).is_err());
    }

    #[test]
    fn bad_sink_path_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig::new().with_output(dir.path().join("nope").join("x.pcap"));
        let mut session = CaptureSession::new(config, running());
        session.bind(loopback()).unwrap();

        let mut source = Replay::frames(1, &ethernet(0x88cc, &[0u8; 46]));
        let mut out = Vec::new();
        let err = session.run_source(&mut source, &mut out).unwrap_err();

        assert!(matches!(err, SniffError::Sink { .. }));
        assert_eq!(source.reads, 0);
    }

    #[test]
    fn failure_is_returned_without_logging_it() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut session = CaptureSession::new(SessionConfig::new(), running());
        session.bind(loopback()).unwrap();
        let mut source = Replay::default();
        source.push(Event::Fail);
        let mut out = Vec::new();

        let result = tracing::subscriber::with_default(subscriber, || session.run_source(&mut source, &mut out));

        assert!(matches!(result, Err(SniffError::Receive(_))));
        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(!text.contains("ERROR"), "{}", text);
    }
}
