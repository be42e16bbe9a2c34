//! Plugin manifest definition

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::application::errors::PluginError;

fn enabled_by_default() -> bool {
    true
}

/// One file in the plugin directory, naming a built-in plugin to enable
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginManifest {
    /// Catalog identifier of the plugin (required)
    pub entry: String,

    /// Set to false to keep the manifest but skip the plugin
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Free text for operators
    #[serde(default)]
    pub description: Option<String>,
}

impl PluginManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let path = path.as_ref();
        let invalid = |reason: String| PluginError::Manifest {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| invalid(format!("Failed to read manifest: {}", e)))?;

        let manifest: Self = serde_yaml::from_str(&content)
            .map_err(|e| invalid(format!("Failed to parse manifest: {}", e)))?;

        if manifest.entry.trim().is_empty() {
            return Err(invalid("entry must not be empty".to_string()));
        }

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_defaults_to_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("10-ping.yaml");
        std::fs::write(&path, "entry: ping\n").unwrap();

        let manifest = PluginManifest::from_file(&path).unwrap();
        assert_eq!(manifest.entry, "ping");
        assert!(manifest.enabled);
        assert_eq!(manifest.description, None);
    }

    #[test]
    fn test_manifest_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "entry: [ping\n").unwrap();

        let err = PluginManifest::from_file(&path).unwrap_err();
        assert!(matches!(err, PluginError::Manifest { .. }));
        assert!(err.to_string().contains("broken.yaml"));

        std::fs::write(&path, "entry: \"\"\n").unwrap();
        assert!(PluginManifest::from_file(&path).is_err());
    }
}
