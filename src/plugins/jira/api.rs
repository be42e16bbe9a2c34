//! Minimal Jira REST client

use std::time::Duration;

use serde::Deserialize;

use crate::application::errors::CommandError;
use super::JiraConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub status: Status,
    #[serde(rename = "issuetype")]
    pub issue_type: IssueType,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub status_category: Option<StatusCategory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCategory {
    pub color_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueType {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Component {
    pub name: String,
}

/// Jira client using basic auth
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Link to the issue in the Jira web UI
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    pub async fn issue(&self, key: &str) -> Result<Issue, CommandError> {
        let issue = self
            .http
            .get(format!("{}/rest/api/2/issue/{}", self.base_url, key))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?
            .error_for_status()?
            .json::<Issue>()
            .await?;

        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_deserializes_from_rest_payload() {
        let json = r#"{
            "key": "ABC-1",
            "fields": {
                "summary": "Broken build",
                "status": {
                    "name": "In Progress",
                    "iconUrl": "https://jira.example.com/status.png",
                    "statusCategory": {"colorName": "yellow"}
                },
                "issuetype": {"name": "Bug"},
                "assignee": null,
                "components": [{"name": "API"}]
            }
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.key, "ABC-1");
        assert_eq!(issue.fields.status.status_category.unwrap().color_name, "yellow");
        assert!(issue.fields.assignee.is_none());
        assert_eq!(issue.fields.components.len(), 1);
    }

    #[test]
    fn test_browse_url_ignores_trailing_slash() {
        let config = JiraConfig {
            base_url: "https://jira.example.com/".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 5,
        };
        let client = JiraClient::new(&config).unwrap();
        assert_eq!(client.browse_url("ABC-1"), "https://jira.example.com/browse/ABC-1");
    }
}
