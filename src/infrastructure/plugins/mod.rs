//! Plugin discovery for pingu
//!
//! Plugins are compiled in. A directory of YAML manifests selects which of
//! them run, and in what order.

pub mod catalog;
pub mod loader;
pub mod manifest;
pub mod registry;

pub use catalog::{Catalog, PluginFactory};
pub use loader::{DiscoveredPlugin, PluginLoader};
pub use manifest::PluginManifest;
pub use registry::PluginRegistry;
