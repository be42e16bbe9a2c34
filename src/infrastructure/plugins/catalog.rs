//! Plugin catalog - Built-in plugin factories keyed by manifest entry

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::errors::PluginError;
use crate::domain::traits::Plugin;
use crate::infrastructure::config::Config;

/// Builds a plugin from the ambient configuration
pub type PluginFactory = Arc<dyn Fn(&Config) -> Result<Arc<dyn Plugin>, PluginError> + Send + Sync>;

/// Maps manifest `entry` identifiers to factories
#[derive(Clone, Default)]
pub struct Catalog {
    factories: BTreeMap<String, PluginFactory>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every plugin shipped with the bot
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        crate::plugins::register_builtin(&mut catalog);
        catalog
    }

    pub fn register<F>(&mut self, entry: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&Config) -> Result<Arc<dyn Plugin>, PluginError> + Send + Sync + 'static,
    {
        self.factories.insert(entry.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.factories.contains_key(entry)
    }

    /// Known identifiers, sorted
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn build(&self, entry: &str, config: &Config) -> Result<Arc<dyn Plugin>, PluginError> {
        let factory = self
            .factories
            .get(entry)
            .ok_or_else(|| PluginError::UnknownEntry(entry.to_string()))?;
        factory(config)
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_every_plugin() {
        let catalog = Catalog::builtin();
        let entries: Vec<&str> = catalog.entries().collect();
        assert_eq!(entries, vec!["aoc", "help", "jira", "ping", "uptime", "version"]);
    }

    #[test]
    fn test_unknown_entry() {
        let err = Catalog::builtin().build("nope", &Config::default()).err().unwrap();
        assert!(matches!(err, PluginError::UnknownEntry(entry) if entry == "nope"));
    }
}
