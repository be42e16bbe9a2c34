//! Runtime core - Session state and the transport event loop

pub mod build_info;
pub mod event_loop;
pub mod session;

pub use build_info::BuildInfo;
pub use event_loop::{ConnectionState, Runtime, RuntimeOptions};
pub use session::Session;
