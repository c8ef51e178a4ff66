//! Vendor record shapes, reduced to the fields the tool reads or writes.

use jiff::Timestamp;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

/// A directory user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile: Map<String, Value>,
}

impl UserRecord {
    /// A string-valued profile attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.profile.get(key).and_then(Value::as_str)
    }

    /// First and last name, or `Unknown` when both are empty.
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let name = name.trim();
        if name.is_empty() {
            "Unknown".to_string()
        } else {
            name.to_string()
        }
    }
}

/// A plugin installation in a space: news channels and store projects alike.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub id: String,
    #[serde(rename = "pluginID", default)]
    pub plugin_id: String,
    #[serde(default)]
    pub config: InstallationConfig,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub plugin_instance: Option<PluginInstance>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallationConfig {
    #[serde(default)]
    pub localization: Localization,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Localization {
    #[serde(rename = "en_US", default)]
    pub en_us: Option<LocalizedTitle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedTitle {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginInstance {
    pub id: Option<String>,
}

impl Installation {
    /// The English display title, empty when unset.
    pub fn title(&self) -> &str {
        self.config
            .localization
            .en_us
            .as_ref()
            .map_or("", |t| t.title.as_str())
    }

    /// Channel id: the nested plugin instance when present, then an explicit
    /// channel id, then the installation id itself.
    pub fn channel_id(&self) -> &str {
        self.plugin_instance
            .as_ref()
            .and_then(|p| p.id.as_deref())
            .or(self.channel_id.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn created_at(&self) -> Option<Timestamp> {
        self.created.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Publication timestamps of a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub planned: Option<String>,
}

impl PostRecord {
    pub fn published_at(&self) -> Option<Timestamp> {
        parse_timestamp(self.published.as_deref())
    }

    pub fn planned_at(&self) -> Option<Timestamp> {
        parse_timestamp(self.planned.as_deref())
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<Timestamp> {
    value.filter(|s| !s.is_empty()).and_then(|s| s.parse().ok())
}

/// A news channel to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    pub title: String,
    pub accessor_ids: Vec<String>,
}

/// The article to place in a new channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub external_id: String,
    pub title: String,
    pub content: String,
    pub teaser: String,
}
