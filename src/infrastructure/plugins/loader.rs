//! Plugin loader - Discovers plugin manifests in a directory

use std::path::{Path, PathBuf};
use crate::application::errors::PluginError;
use super::manifest::PluginManifest;

/// A manifest together with the file it came from
#[derive(Debug, Clone)]
pub struct DiscoveredPlugin {
    pub path: PathBuf,
    pub manifest: PluginManifest,
}

/// Plugin loader
pub struct PluginLoader {
    plugin_dir: PathBuf,
}

impl PluginLoader {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }

    /// Read every `.yaml`/`.yml` manifest in file name order.
    ///
    /// Hidden files, subdirectories and other extensions are skipped. Any
    /// unreadable directory or manifest fails the whole discovery.
    pub fn discover(&self) -> Result<Vec<DiscoveredPlugin>, PluginError> {
        let unreadable = |source: std::io::Error| PluginError::Directory {
            path: self.plugin_dir.display().to_string(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.plugin_dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if is_manifest(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut discovered = Vec::with_capacity(paths.len());
        for path in paths {
            let manifest = PluginManifest::from_file(&path)?;
            tracing::debug!(path = %path.display(), entry = %manifest.entry, "Found plugin manifest");
            discovered.push(DiscoveredPlugin { path, manifest });
        }

        Ok(discovered)
    }
}

fn is_manifest(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }

    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
