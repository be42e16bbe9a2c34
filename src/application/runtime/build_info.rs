use chrono::{DateTime, Utc};

use crate::application::errors::ConfigError;

/// Version and build time, fixed once at process start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    version: String,
    built_at: DateTime<Utc>,
}

impl BuildInfo {
    pub fn new(version: impl Into<String>, built_at: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            built_at,
        }
    }

    /// Read the values baked in at compile time.
    ///
    /// `PINGU_VERSION` overrides the crate version (CI sets it to the commit
    /// hash); `PINGU_BUILT_AT` is an RFC 3339 timestamp and defaults to now.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let version = option_env!("PINGU_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        Self::parse(version, option_env!("PINGU_BUILT_AT"))
    }

    pub fn parse(version: &str, built_at: Option<&str>) -> Result<Self, ConfigError> {
        let version = if version.trim().is_empty() { "dev" } else { version.trim() };

        let built_at = match built_at {
            Some(raw) if !raw.trim().is_empty() => DateTime::parse_from_rfc3339(raw.trim())
                .map_err(|e| ConfigError::InvalidValue(format!("build time '{}': {}", raw, e)))?
                .with_timezone(&Utc),
            _ => Utc::now(),
        };

        Ok(Self::new(version, built_at))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// `development build`, `rev. abc1234` or `ver. 1.2.3`
    pub fn friendly_version(&self) -> String {
        let version = self.version.as_str();
        let is_hash = !version.is_empty()
            && version.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));

        if version == "dev" {
            "development build".to_string()
        } else if is_hash {
            format!("rev. {}", &version[..version.len().min(7)])
        } else {
            format!("ver. {}", version)
        }
    }
}
