//! pingu - a chat bot runtime hosting plugins over a persistent transport
//!
//! Plugins contribute triggered commands and scheduled tasks. The runtime
//! routes inbound messages to every matching command, runs tasks on their
//! schedules and catches them up whenever the transport (re)connects.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;
