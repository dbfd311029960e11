//! Fetches an account's statuses from a Mastodon instance and transforms
//! them into [`MastodonPost`]s, the same shape the site uses for talks.

use crate::config::Mastodon as MastodonConfig;
use crate::media::{Music, Video, VideoKind, Website};
use regex::{Captures, Regex};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};
use url::Url;

/// A status as returned by `GET /api/v1/accounts/:id/statuses`. Only the
/// fields the site uses are kept.
#[derive(Deserialize, Clone, Debug)]
pub struct Status {
    pub id: String,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub emojis: Vec<Emoji>,
    #[serde(default)]
    pub media_attachments: Vec<MediaAttachment>,
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<StatusTag>,
}

/// A custom emoji, referenced in content as `:shortcode:`.
#[derive(Deserialize, Clone, Debug)]
pub struct Emoji {
    pub shortcode: String,
    pub static_url: String,
    pub url: String,
    #[serde(default)]
    pub visible_in_picker: bool,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Gifv,
    Audio,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Clone, Debug)]
pub struct MediaAttachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub text_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub blurhash: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StatusTag {
    pub name: String,
    pub url: String,
}

/// A transformed status. For reblogs, every field except `is_reblog`
/// describes the reblogged status.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MastodonPost {
    pub id: String,

    /// The status HTML, with known custom emoji replaced by `<img>` tags.
    pub text: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<Website>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<Music>,
    pub tags: Vec<String>,
    #[serde(rename = "isReblog")]
    pub is_reblog: bool,
    #[serde(rename = "isReply")]
    pub is_reply: bool,
}

/// Builds the statuses endpoint for the configured account. Replies are
/// excluded; `tag`, when empty, matches everything. `instance` is a host name
/// (served over https) or a base URL with its own scheme.
pub fn statuses_url(config: &MastodonConfig) -> Result<Url> {
    if config.instance.is_empty() || config.user_id.is_empty() {
        return Err(Error::MissingAccount);
    }
    let base = match config.instance.contains("://") {
        true => config.instance.trim_end_matches('/').to_owned(),
        false => format!("https://{}", config.instance),
    };
    let mut url = Url::parse(&format!(
        "{}/api/v1/accounts/{}/statuses",
        base, config.user_id
    ))?;
    url.query_pairs_mut()
        .append_pair("tagged", &config.tag)
        .append_pair("exclude_replies", "true");
    Ok(url)
}

/// Transforms at most `shown_max` statuses, in order.
pub fn transform(statuses: Vec<Status>, shown_max: usize) -> Vec<MastodonPost> {
    let emoji = Regex::new(r":([A-Za-z0-9_]+):").unwrap(); // constant, always compiles
    statuses
        .into_iter()
        .take(shown_max)
        .map(|status| transform_status(status, &emoji))
        .collect()
}

fn transform_status(mut status: Status, emoji: &Regex) -> MastodonPost {
    let (target, is_reblog) = match status.reblog.take() {
        Some(reblog) => (*reblog, true),
        None => (status, false),
    };

    let images: Vec<String> = target
        .media_attachments
        .iter()
        .filter(|a| a.kind == MediaKind::Image)
        .map(|a| a.url.clone())
        .collect();

    let video = target
        .media_attachments
        .iter()
        .find(|a| a.kind == MediaKind::Video || a.kind == MediaKind::Gifv)
        .map(|a| Video {
            poster: a.preview_url.clone(),
            ..Video::new(VideoKind::Raw, a.id.clone())
        });

    MastodonPost {
        text: replace_emojis(emoji, &target.content, &target.emojis),
        is_reply: target.in_reply_to_id.is_some(),
        images: match images.is_empty() {
            true => None,
            false => Some(images),
        },
        video,
        website: None,
        music: None,
        tags: target.tags.into_iter().map(|t| t.name).collect(),
        is_reblog,
        id: target.id,
        date: target.created_at,
    }
}

/// Replaces `:shortcode:` with an `<img>` for each known custom emoji.
/// Unknown shortcodes are left alone.
fn replace_emojis(re: &Regex, content: &str, emojis: &[Emoji]) -> String {
    if emojis.is_empty() {
        return content.to_owned();
    }
    re.replace_all(content, |caps: &Captures| {
        match emojis.iter().find(|e| e.shortcode == caps[1]) {
            Some(e) => format!(
                r#"<img class="emoji" src="{}" alt="{}"/>"#,
                e.static_url, &caps[1]
            ),
            None => caps[0].to_owned(),
        }
    })
    .into_owned()
}

/// Fetches and transforms the configured account's statuses. Any failure is
/// logged and yields an empty list.
pub fn fetch_posts(client: &Client, config: &MastodonConfig) -> Vec<MastodonPost> {
    match try_fetch_posts(client, config) {
        Ok(posts) => posts,
        Err(e) => {
            error!(instance = %config.instance, error = %e, "fetching Mastodon statuses");
            Vec::new()
        }
    }
}

fn try_fetch_posts(client: &Client, config: &MastodonConfig) -> Result<Vec<MastodonPost>> {
    let url = statuses_url(config)?;
    let mut request = client.get(url.as_str());
    if let Some(token) = config.token() {
        request = request.bearer_auth(token);
    }
    let statuses: Vec<Status> = request.send()?.error_for_status()?.json()?;
    debug!(count = statuses.len(), "received Mastodon statuses");
    Ok(transform(statuses, config.shown_max))
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a failure fetching Mastodon statuses.
#[derive(Debug)]
pub enum Error {
    /// Returned when the instance or user id is not configured.
    MissingAccount,

    /// Returned when the instance does not form a valid URL.
    UrlParse(url::ParseError),

    /// Returned for transport, status and body-decoding errors.
    Http(reqwest::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingAccount => {
                write!(f, "Mastodon instance and user id are required")
            }
            Error::UrlParse(err) => err.fmt(f),
            Error::Http(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingAccount => None,
            Error::UrlParse(err) => Some(err),
            Error::Http(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}
