//! Domain layer - Core runtime vocabulary
//!
//! This layer contains:
//! - Entities: Commands, tasks, inbound messages, transport events
//! - Traits: Abstractions for plugins and transports

pub mod entities;
pub mod traits;
