//! Advent of Code private leaderboard API

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, COOKIE};
use serde::Deserialize;

use crate::application::errors::CommandError;
use super::AocConfig;

/// Older payloads send ids and timestamps as strings, newer ones as numbers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(i64),
    Text(String),
}

impl NumberOrString {
    pub fn as_i64(&self) -> i64 {
        match self {
            NumberOrString::Number(n) => *n,
            NumberOrString::Text(s) => s.parse().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub members: HashMap<String, MemberResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberResponse {
    pub id: NumberOrString,
    #[serde(default)]
    pub global_score: i64,
    #[serde(default)]
    pub local_score: i64,
    #[serde(default)]
    pub last_star_ts: Option<NumberOrString>,
    /// Anonymous members have no name
    #[serde(default)]
    pub name: Option<String>,
    /// day -> part -> completion
    #[serde(default)]
    pub completion_day_level: HashMap<u32, HashMap<u32, StarResponse>>,
    #[serde(default)]
    pub stars: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StarResponse {
    #[serde(default)]
    pub get_star_ts: Option<NumberOrString>,
}

pub struct AocClient {
    http: reqwest::Client,
    base_url: String,
    owner: u64,
    session: String,
}

impl AocClient {
    pub fn new(config: &AocConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            owner: config.owner,
            session: config.session.clone(),
        })
    }

    /// Fetch the private leaderboard of one event year
    pub async fn leaderboard(&self, year: i32) -> Result<ApiResponse, CommandError> {
        let url = format!(
            "{}/{}/leaderboard/private/view/{}.json",
            self.base_url, year, self.owner
        );

        let response = self
            .http
            .get(url)
            .header(COOKIE, format!("session={}", self.session))
            .send()
            .await?
            .error_for_status()?;

        // An expired session is answered with the HTML login page
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.starts_with("application/json"));
        if !is_json {
            return Err(CommandError::Upstream(format!(
                "authentication failed for the {} leaderboard",
                year
            )));
        }

        Ok(response.json::<ApiResponse>().await?)
    }
}
