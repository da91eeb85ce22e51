//! Process lifecycle: graceful shutdown signals

mod shutdown;

pub use shutdown::wait_for_shutdown;
