//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Plugins: Manifest discovery and the built-in catalog
//! - Adapters: Platform integrations (Slack, console, in-memory)

pub mod adapters;
pub mod config;
pub mod plugins;
