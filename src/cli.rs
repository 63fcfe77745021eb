use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Sniffy - Rust packet sniffer
#[derive(Parser, Debug)]
#[command(name = "sniffy", about = "Rust packet sniffer with optional PCAP export")]
pub struct CliArgs {
    /// Network interface to listen on (name or ID)
    #[arg(short = 'i', value_name = "NAME|ID")]
    pub interface: Option<String>,

    /// Set a BPF packet filter (ex. 'udp and dst port 5355')
    #[arg(short = 'f', value_name = "EXPR")]
    pub filter: Option<String>,

    /// List network interfaces
    #[arg(short = 'l')]
    pub list: bool,

    /// File to save the data to
    #[arg(short = 'w', value_name = "FILE")]
    pub write: Option<PathBuf>,

    /// Number of packets to capture (Default: continue until stopped)
    #[arg(short = 'n', value_name = "COUNT", default_value_t = 0)]
    pub count: usize,

    /// Verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Full help text, as printed when no interface was given.
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}
