use serde::{Deserialize, Serialize};

/// An inbound text event from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub user: String,
    pub channel: String,
    pub text: String,
}

impl InboundMessage {
    pub fn new(user: impl Into<String>, channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            channel: channel.into(),
            text: text.into(),
        }
    }
}

/// Structured message payload (Slack legacy attachment)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub mrkdwn_in: Vec<String>,
}

impl Attachment {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, name: impl Into<String>, icon: Option<String>) -> Self {
        self.author_name = Some(name.into());
        self.author_icon = icon;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_pretext(mut self, pretext: impl Into<String>) -> Self {
        self.pretext = Some(pretext.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_markdown_in(mut self, fields: &[&str]) -> Self {
        self.mrkdwn_in = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_serializes_only_set_fields() {
        let attachment = Attachment::new("ABC-1: Broken build")
            .with_color("#14892C")
            .with_markdown_in(&["pretext", "text"]);

        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["fallback"], "ABC-1: Broken build");
        assert_eq!(json["color"], "#14892C");
        assert_eq!(json["mrkdwn_in"], serde_json::json!(["pretext", "text"]));
        assert!(json.get("author_name").is_none());
    }
}
