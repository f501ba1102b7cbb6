pub mod audio;
pub mod config;
mod logging;
pub mod presenter;
mod telemetry;
pub mod terminal_restore;

pub use logging::{init_logging, log_debug, log_file_path, log_panic};
pub use telemetry::init_tracing;
