//! Jira - posts issue summaries for every `!KEY-123` mentioned in a message

pub mod api;

use std::sync::Arc;

use regex_lite::Regex;
use serde::Deserialize;
use tracing::error;

use crate::application::errors::{CommandError, PluginError};
use crate::application::execution::fan_out;
use crate::application::format::join_with_and;
use crate::application::runtime::Session;
use crate::domain::entities::{Attachment, Command, InboundMessage};
use crate::domain::traits::{Author, Plugin};
use crate::infrastructure::config::Config;
use super::{builtin_author, BUILTIN_VERSION};
use api::{Issue, JiraClient};

/// Any non-digit (or start of text) followed by `!KEY-123`
const ISSUE_PATTERN: &str = r"(?:^|\D)!(\w+-\d+)";

fn default_timeout() -> u64 {
    10
}

/// The `jira` config section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraConfig {
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

pub struct Jira {
    commands: Vec<Command>,
}

/// Issue keys referenced in `text`, in order of appearance
pub fn issue_keys(trigger: &Regex, text: &str) -> Vec<String> {
    trigger
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Attachment color for a Jira status category
pub fn status_color(color_name: Option<&str>) -> &'static str {
    match color_name {
        Some("green") => "#14892C",
        Some("yellow") => "#F6C342",
        _ => "#4A6785",
    }
}

/// Build the Slack attachment for one issue
pub fn issue_attachment(issue: &Issue, browse_url: &str) -> Attachment {
    let fields = &issue.fields;
    let mut body = String::new();

    if let Some(assignee) = &fields.assignee {
        body.push_str(&format!("_Assigned to_ *{}*", assignee.display_name));
    }

    if !fields.components.is_empty() {
        body.push_str(if body.is_empty() { "_Affecting_ " } else { " _affecting_ " });
        let components: Vec<String> = fields
            .components
            .iter()
            .map(|c| format!("*{}*", c.name))
            .collect();
        body.push_str(&join_with_and(&components, ", ", " _and_ "));
    }

    if !body.is_empty() {
        body.push('.');
    }

    let color = status_color(
        fields
            .status
            .status_category
            .as_ref()
            .map(|c| c.color_name.as_str()),
    );

    let mut attachment = Attachment::new(format!("{}: {}", issue.key, fields.summary))
        .with_author(
            format!("{} {}", fields.status.name, fields.issue_type.name),
            fields.status.icon_url.clone(),
        )
        .with_color(color)
        .with_pretext(format!("*<{}|{}>*: {}", browse_url, issue.key, fields.summary))
        .with_markdown_in(&["pretext", "text"]);

    if !body.is_empty() {
        attachment = attachment.with_text(body);
    }

    attachment
}

impl Jira {
    pub fn new(config: &JiraConfig, fan_out_limit: usize) -> Result<Self, PluginError> {
        let client = Arc::new(JiraClient::new(config).map_err(|e| PluginError::Construction {
            name: "jira".to_string(),
            reason: e.to_string(),
        })?);

        let trigger = Regex::new(ISSUE_PATTERN).map_err(|e| PluginError::Trigger {
            pattern: ISSUE_PATTERN.to_string(),
            reason: e.to_string(),
        })?;

        let keys_trigger = trigger.clone();
        let command = Command::with_trigger(
            "Retrieves one or multiple issues from JIRA.",
            trigger,
            move |session: Arc<Session>, message: InboundMessage| {
                let client = Arc::clone(&client);
                let keys = issue_keys(&keys_trigger, &message.text);
                async move {
                    post_issues(&session, &message, &client, keys, fan_out_limit).await;
                    Ok::<(), CommandError>(())
                }
            },
        );

        Ok(Self {
            commands: vec![command],
        })
    }
}

async fn post_issues(
    session: &Session,
    message: &InboundMessage,
    client: &Arc<JiraClient>,
    keys: Vec<String>,
    fan_out_limit: usize,
) {
    if keys.is_empty() {
        return;
    }

    let results = fan_out(fan_out_limit, keys.clone(), |key: String| {
        let client = Arc::clone(client);
        async move { client.issue(&key).await }
    })
    .await;

    let mut attachments = Vec::new();
    let mut invalid = Vec::new();

    for (key, result) in keys.into_iter().zip(results) {
        match result {
            Ok(issue) => attachments.push(issue_attachment(&issue, &client.browse_url(&issue.key))),
            Err(e) => {
                error!(plugin = "Jira", issue = %key, error = %e, "Failed to retrieve issue");
                invalid.push(key);
            }
        }
    }

    if !attachments.is_empty() {
        session.send_attachments(&attachments, &message.channel).await;
    }

    if !invalid.is_empty() {
        let text = format!("I was unable to retrieve {}.", join_with_and(&invalid, ", ", " and "));
        session.reply(message, &text).await;
    }
}

pub fn factory(config: &Config) -> Result<Arc<dyn Plugin>, PluginError> {
    let section: JiraConfig = config
        .section("jira")
        .map_err(|e| PluginError::Construction {
            name: "jira".to_string(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| PluginError::Construction {
            name: "jira".to_string(),
            reason: "missing 'jira' config section".to_string(),
        })?;

    Ok(Arc::new(Jira::new(&section, config.runtime.fan_out_limit)?))
}

impl Plugin for Jira {
    fn name(&self) -> &str {
        "Jira"
    }

    fn author(&self) -> Author {
        builtin_author()
    }

    fn version(&self) -> &str {
        BUILTIN_VERSION
    }

    fn commands(&self) -> &[Command] {
        &self.commands
    }
}
