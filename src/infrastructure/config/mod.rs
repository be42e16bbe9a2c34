//! Configuration management

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::application::errors::ConfigError;

/// Template written by `init-config`
pub const DEFAULT_CONFIG: &str = r#"# pingu configuration

bot:
  name: Pingu

slack:
  # Prefer the SLACK_BOT_TOKEN / SLACK_APP_TOKEN environment variables
  bot-token: ""
  app-token: ""

plugins:
  # One YAML manifest per plugin, loaded in file name order
  directory: ./plugins

runtime:
  handler-timeout-secs: 30
  catch-up-timeout-secs: 60
  fan-out-limit: 4

# Plugin sections are read by the plugin that owns them
# jira:
#   base-url: https://jira.example.com
#   username: pingu
#   password: secret
#   timeout-secs: 10
#
# aoc:
#   session: ""
#   owner: 123456
#   channel: C0123456
#   timeout-secs: 10
"#;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub plugins: PluginConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Everything else, keyed by plugin
    #[serde(flatten)]
    pub sections: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Pingu".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SlackConfig {
    pub bot_token: String,
    pub app_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    pub directory: PathBuf,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./plugins"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RuntimeConfig {
    pub handler_timeout_secs: u64,
    pub catch_up_timeout_secs: u64,
    pub fan_out_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            handler_timeout_secs: 30,
            catch_up_timeout_secs: 60,
            fan_out_limit: 4,
        }
    }
}

impl RuntimeConfig {
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.handler_timeout_secs)
    }

    pub fn catch_up_timeout(&self) -> Duration {
        Duration::from_secs(self.catch_up_timeout_secs)
    }
}

impl Config {
    /// Load a config file and apply environment overrides.
    /// A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Apply `SLACK_BOT_TOKEN`, `SLACK_APP_TOKEN` and `PINGU_PLUGIN_DIR`
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("SLACK_BOT_TOKEN").filter(|v| !v.is_empty()) {
            self.slack.bot_token = token;
        }

        if let Some(token) = lookup("SLACK_APP_TOKEN").filter(|v| !v.is_empty()) {
            self.slack.app_token = token;
        }

        if let Some(dir) = lookup("PINGU_PLUGIN_DIR").filter(|v| !v.is_empty()) {
            self.plugins.directory = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.name.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.name".to_string()));
        }
        if self.runtime.handler_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "runtime.handler-timeout-secs must be at least 1".to_string(),
            ));
        }
        if self.runtime.catch_up_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "runtime.catch-up-timeout-secs must be at least 1".to_string(),
            ));
        }
        if self.runtime.fan_out_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "runtime.fan-out-limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Both tokens are required for the Slack transport
    pub fn require_slack_tokens(&self) -> Result<(&str, &str), ConfigError> {
        if self.slack.bot_token.is_empty() {
            return Err(ConfigError::MissingField("slack.bot-token".to_string()));
        }
        if self.slack.app_token.is_empty() {
            return Err(ConfigError::MissingField("slack.app-token".to_string()));
        }
        Ok((&self.slack.bot_token, &self.slack.app_token))
    }

    /// Deserialize a plugin section. `Ok(None)` when the section is absent.
    pub fn section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.sections.get(key) {
            None => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::Parse(format!("Invalid '{}' section: {}", key, e))),
        }
    }

    /// Write the default template, refusing to overwrite an existing file
    pub fn write_default(path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Err(ConfigError::InvalidValue(format!(
                "{} already exists",
                path.display()
            )));
        }
        std::fs::write(path, DEFAULT_CONFIG)?;
        Ok(())
    }
}
