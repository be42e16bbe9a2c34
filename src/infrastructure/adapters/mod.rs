//! Transport adapters

pub mod console;
pub mod memory;
pub mod slack;

pub use console::ConsoleTransport;
pub use memory::{MemoryTransport, Outbound};
pub use slack::{SlackOptions, SlackTransport};
