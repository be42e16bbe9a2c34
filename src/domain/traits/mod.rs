//! Domain traits - Abstractions for plugins and transports

pub mod plugin;
pub mod transport;

pub use plugin::{Author, Plugin};
pub use transport::Transport;
