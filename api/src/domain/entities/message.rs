//! Message log records
//!
//! A read-only view of one row of the bridge's `msglog` table.

use serde::{Deserialize, Serialize};

use super::AccountKey;

/// The bridge's `msg_type` column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Text,
    Link,
    Image,
    Animation,
    Sticker,
    Video,
    Voice,
    File,
    Location,
    Status,
    Unsupported,
    /// Any type this bridge version does not know about
    Other(String),
}

impl MessageKind {
    /// Human readable label used in placeholders and fallback titles
    pub fn label(&self) -> &str {
        match self {
            MessageKind::Text => "Text",
            MessageKind::Link => "Link",
            MessageKind::Image => "Image",
            MessageKind::Animation => "Animation",
            MessageKind::Sticker => "Sticker",
            MessageKind::Video => "Video",
            MessageKind::Voice => "Voice",
            MessageKind::File => "File",
            MessageKind::Location => "Location",
            MessageKind::Status => "Status",
            MessageKind::Unsupported => "Unsupported",
            MessageKind::Other(other) => other,
        }
    }

    /// Whether the record points at binary content hosted elsewhere
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            MessageKind::Image
                | MessageKind::Animation
                | MessageKind::Sticker
                | MessageKind::Video
                | MessageKind::Voice
                | MessageKind::File
        )
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for MessageKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Text" => MessageKind::Text,
            "Link" => MessageKind::Link,
            "Image" => MessageKind::Image,
            "Animation" => MessageKind::Animation,
            "Sticker" => MessageKind::Sticker,
            "Video" => MessageKind::Video,
            "Voice" | "Audio" => MessageKind::Voice,
            "File" => MessageKind::File,
            "Location" => MessageKind::Location,
            "Status" => MessageKind::Status,
            "Unsupported" => MessageKind::Unsupported,
            other => MessageKind::Other(other.to_string()),
        })
    }
}

/// Shared article attached to a `Link` message
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkAttributes {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Where a media message's payload lives, as recorded by the bridge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub media_type: Option<String>,
    pub mime: Option<String>,
}

/// One row of the message log attributed to a public account
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    /// Log primary key (`master_msg_id`), stable across restarts
    pub message_id: String,
    /// SQLite rowid, used to break timestamp ties
    pub seq: i64,
    /// Parsed from `slave_origin_uid`; None when the column is not in the expected form
    pub account: Option<AccountKey>,
    pub kind: MessageKind,
    pub text: String,
    pub media: Option<MediaDescriptor>,
    /// Decoded structured payload (link attributes, coordinates, ...)
    pub attributes: Option<serde_json::Value>,
    /// Raw `time` column
    pub time: Option<String>,
}

impl MessageRecord {
    /// Link attributes, if the payload carries them
    pub fn link_attributes(&self) -> Option<LinkAttributes> {
        self.attributes
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
