use std::path::PathBuf;

use thiserror::Error;

use crate::core::session::SessionState;

pub type Result<T> = std::result::Result<T, SniffError>;

#[derive(Error, Debug)]
pub enum SniffError {
    #[error("error getting all devices: {0}")]
    Enumeration(#[source] pcap::Error),

    #[error("error finding device '{0}'")]
    NotFound(String),

    #[error("failed to open device {device}: {source}")]
    DeviceOpen {
        device: String,
        #[source]
        source: pcap::Error,
    },

    #[error("invalid filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: pcap::Error,
    },

    #[error("failed to create capture file {}: {source}", path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: pcap::Error,
    },

    #[error("capture error: {0}")]
    Receive(#[source] pcap::Error),

    #[error("failed to write packet summary: {0}")]
    Output(#[from] std::io::Error),

    #[error("session is {actual:?}, expected {expected}")]
    InvalidState {
        actual: SessionState,
        expected: &'static str,
    },

    #[error("failed to set interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
