//! Plugin registry - Holds the loaded plugins in discovery order

use std::path::Path;
use std::sync::Arc;
use crate::application::errors::PluginError;
use crate::domain::traits::Plugin;
use crate::infrastructure::config::Config;
use super::catalog::Catalog;
use super::loader::PluginLoader;

/// Ordered, fixed set of plugins for the process lifetime
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn from_plugins(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// Discover manifests in `dir` and build each enabled plugin.
    /// Any failure aborts the whole load.
    pub fn load(dir: impl AsRef<Path>, config: &Config, catalog: &Catalog) -> Result<Self, PluginError> {
        let loader = PluginLoader::new(dir.as_ref());
        let mut plugins = Vec::new();

        for found in loader.discover()? {
            let manifest = &found.manifest;
            if !manifest.enabled {
                tracing::info!(entry = %manifest.entry, path = %found.path.display(), "Plugin disabled");
                continue;
            }

            let plugin = catalog.build(&manifest.entry, config)?;
            tracing::info!(
                plugin = plugin.name(),
                author = %plugin.author(),
                version = plugin.version(),
                "Plugin loaded"
            );
            plugins.push(plugin);
        }

        Ok(Self { plugins })
    }

    /// Plugins in registry order
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Get a plugin by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Command;
    use crate::domain::traits::Author;

    struct Named(String);

    impl Plugin for Named {
        fn name(&self) -> &str {
            &self.0
        }

        fn author(&self) -> Author {
            Author::new("Test", "test@example.com")
        }

        fn version(&self) -> &str {
            "1.0"
        }

        fn commands(&self) -> &[Command] {
            &[]
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register("alpha", |_config: &Config| Ok(Arc::new(Named("Alpha".to_string())) as Arc<dyn Plugin>))
            .register("beta", |config: &Config| {
                Ok(Arc::new(Named(format!("Beta for {}", config.bot.name))) as Arc<dyn Plugin>)
            })
            .register("broken", |_config: &Config| {
                Err(PluginError::Construction {
                    name: "broken".to_string(),
                    reason: "missing settings".to_string(),
                })
            });
        catalog
    }

    #[test]
    fn test_load_follows_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "entry: alpha\n").unwrap();
        std::fs::write(dir.path().join("a.yaml"), "entry: beta\n").unwrap();
        std::fs::write(dir.path().join("c.yaml"), "entry: broken\nenabled: false\n").unwrap();

        let registry = PluginRegistry::load(dir.path(), &Config::default(), &catalog()).unwrap();

        assert_eq!(registry.names(), vec!["Beta for Pingu", "Alpha"]);
        assert!(registry.get("Alpha").is_some());
        assert!(registry.get("Gamma").is_none());
    }

    #[test]
    fn test_failing_factory_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "entry: alpha\n").unwrap();
        std::fs::write(dir.path().join("b.yaml"), "entry: broken\n").unwrap();

        let err = PluginRegistry::load(dir.path(), &Config::default(), &catalog()).unwrap_err();
        assert!(matches!(err, PluginError::Construction { .. }));
    }

    #[test]
    fn test_unknown_entry_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "entry: gamma\n").unwrap();

        let err = PluginRegistry::load(dir.path(), &Config::default(), &catalog()).unwrap_err();
        assert!(matches!(err, PluginError::UnknownEntry(_)));
    }
}
