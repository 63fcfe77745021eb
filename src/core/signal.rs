use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::Result;

/// Sets up a Ctrl+C (and SIGTERM) handler that sets a shared atomic `running` flag to false
///
/// # Arguments
///
/// * `running_flag` - A shared atomic boolean flag used to gracefully terminate the capture loop
///
/// # Errors
///
/// Fails if a handler is already installed or the OS refuses it
pub fn setup_ctrlc_handler(running_flag: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running_flag.store(false, Ordering::SeqCst);
    })?;
    Ok(())
}
