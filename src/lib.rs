pub mod config;
pub mod core;
pub mod gateway;
pub mod list;
pub mod notify;
pub mod store;

pub use gateway::MutationGateway;
pub use list::{TodoList, ViewEvent};
pub use store::{RecordStore, StoreError};

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether debug logging is active, shared between the logger filter and the config.
static DEBUG_LOGGING: AtomicBool = AtomicBool::new(false);

pub fn set_debug_logging(enabled: bool) {
    DEBUG_LOGGING.store(enabled, Ordering::Relaxed);
}

pub fn debug_logging() -> bool {
    DEBUG_LOGGING.load(Ordering::Relaxed)
}
