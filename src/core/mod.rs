pub mod runner;
pub mod session;
pub mod signal;
pub mod summary;
