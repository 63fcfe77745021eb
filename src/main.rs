use std::{
    io,
    process,
    sync::{atomic::AtomicBool, Arc},
};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, Level};

use sniffy::cli::CliArgs;
use sniffy::config::SessionConfig;
use sniffy::core::session::CaptureSession;
use sniffy::core::signal::setup_ctrlc_handler;
use sniffy::core::summary::print_packet_summary;
use sniffy::interfaces::{Interface, Inventory};
use sniffy::ui::device::print_device_list;

fn main() {
    // Parse CLI args
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    let inventory = match Inventory::enumerate() {
        Ok(inventory) => inventory,
        Err(err) => {
            error!("{}", err);
            println!("Error getting the network interfaces");
            process::exit(1);
        }
    };

    if args.list {
        if let Err(err) = print_device_list(&inventory, &mut io::stdout().lock()) {
            error!("Failed to print interfaces: {}", err);
            process::exit(1);
        }
        process::exit(0);
    }

    let Some(query) = args.interface.as_deref() else {
        println!("{}", CliArgs::usage());
        println!("You must specify an interface to use");
        process::exit(0);
    };

    let device = match inventory.resolve(query) {
        Ok(device) => device.clone(),
        Err(err) => {
            debug!("{}", err);
            println!("Invalid interface specified");
            process::exit(0);
        }
    };

    if let Err(err) = run(device, SessionConfig::from(&args)) {
        error!("{:#}", err);
        process::exit(1);
    }
}

fn run(device: Interface, config: SessionConfig) -> anyhow::Result<()> {
    // Shared shutdown flag
    let running = Arc::new(AtomicBool::new(true));
    setup_ctrlc_handler(Arc::clone(&running))?;

    let name = device.name.clone();
    let mut session = CaptureSession::new(config, running);
    debug!("Session config: {:?}", session.config());
    session.bind(device)?;

    let report = session
        .start()
        .with_context(|| format!("capture on {} failed", name))?;
    print_packet_summary(&report);
    Ok(())
}
