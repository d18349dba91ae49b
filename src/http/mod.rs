//! HTTP server module.
//!
//! The server includes:
//! - Plain HTTP listener bound from `[http]` settings
//! - Graceful shutdown on SIGTERM/SIGINT

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
pub use shutdown::shutdown_signal;
