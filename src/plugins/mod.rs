//! Built-in plugins for pingu
//!
//! Each plugin exposes a `factory` that the catalog maps to its manifest
//! entry name.

pub mod aoc;
pub mod help;
pub mod jira;
pub mod ping;
pub mod uptime;
pub mod version;

use crate::domain::traits::Author;
use crate::infrastructure::plugins::Catalog;

/// Version reported by every built-in plugin
pub const BUILTIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Author of the built-in plugins
pub fn builtin_author() -> Author {
    Author::new("Jonas Stendahl", "jonas@stendahl.me")
}

/// Register every built-in plugin under its manifest entry name
pub fn register_builtin(catalog: &mut Catalog) {
    catalog
        .register("aoc", aoc::factory)
        .register("help", help::factory)
        .register("jira", jira::factory)
        .register("ping", ping::factory)
        .register("uptime", uptime::factory)
        .register("version", version::factory);
}
