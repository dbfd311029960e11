//! The media attachments shared by talks and Mastodon posts. Field names
//! serialize the way the site's front end expects them.

use serde::{Deserialize, Serialize};

/// Where a video is hosted. `Raw` is a direct file URL or attachment id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoKind {
    Raw,
    Bilibili,
    BilibiliNano,
    Youtube,
    Douyin,
    DouyinWide,
    Tiktok,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "type")]
    pub kind: VideoKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl Video {
    pub fn new<S: Into<String>>(kind: VideoKind, id: S) -> Video {
        Video {
            kind,
            id: id.into(),
            ratio: None,
            poster: None,
        }
    }
}

/// A link card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Website {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A music player embed. Only `url` is required; the rest configure the
/// player when the track comes from a known service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Music {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}
