//! Outbound reply payloads

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Message flag that hides a response from everyone but the invoking user.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// Embed field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Embed footer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

/// Message embed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter { text: text.into() });
        self
    }

    /// Discord's embed object (`image` nested as `{ "url": .. }`).
    pub fn to_discord_json(&self) -> Value {
        let mut value = json!({});
        if let Some(title) = &self.title {
            value["title"] = json!(title);
        }
        if let Some(description) = &self.description {
            value["description"] = json!(description);
        }
        if !self.fields.is_empty() {
            value["fields"] = json!(self.fields);
        }
        if let Some(color) = self.color {
            value["color"] = json!(color);
        }
        if let Some(footer) = &self.footer {
            value["footer"] = json!({ "text": footer.text });
        }
        if let Some(url) = &self.image_url {
            value["image"] = json!({ "url": url });
        }
        value
    }
}

/// Message content sent by any reply operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReplyPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub ephemeral: bool,
}

impl ReplyPayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Discord message body as accepted by the callback, webhook edit and
    /// follow-up endpoints.
    pub fn to_discord_message(&self) -> Value {
        let mut body = json!({});
        if let Some(content) = &self.content {
            body["content"] = json!(content);
        }
        if !self.embeds.is_empty() {
            body["embeds"] = Value::Array(self.embeds.iter().map(Embed::to_discord_json).collect());
        }
        if self.ephemeral {
            body["flags"] = json!(EPHEMERAL_FLAG);
        }
        body
    }
}
