use std::path::PathBuf;

use crate::cli::CliArgs;

/// Maximum bytes captured per frame; also declared in the capture file header.
pub const SNAPSHOT_LEN: i32 = 65535;

pub const PROMISCUOUS: bool = false;

/// How long one read may block before the loop re-checks for cancellation.
/// A timed-out read is not a frame and is invisible to the user.
pub const READ_TIMEOUT_MS: i32 = 500;

/// Settings for one capture session. Fixed before the session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// BPF expression; `None` captures everything.
    pub filter: Option<String>,
    /// pcap file the raw frames are mirrored to.
    pub output: Option<PathBuf>,
    /// Stop after this many frames; `None` runs until interrupted.
    pub limit: Option<usize>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = (!filter.is_empty()).then_some(filter);
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.output = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    /// 0 means unbounded.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = (limit != 0).then_some(limit);
        self
    }

    pub fn limit_reached(&self, processed: usize) -> bool {
        self.limit.is_some_and(|limit| processed >= limit)
    }
}

impl From<&CliArgs> for SessionConfig {
    fn from(args: &CliArgs) -> Self {
        let mut config = SessionConfig::new().with_limit(args.count);
        if let Some(filter) = &args.filter {
            config = config.with_filter(filter.as_str());
        }
        if let Some(path) = &args.write {
            config = config.with_output(path.as_path());
        }
        config
    }
}
