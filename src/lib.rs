//! Sniffy: a small libpcap packet sniffer.
//!
//! Frames are decoded by [`packet`], labelled by [`classify`], and driven
//! through a [`core::session::CaptureSession`].

pub mod capture;
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod interfaces;
pub mod packet;
pub mod ui;
