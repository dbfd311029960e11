//! Fetches "talks" (short posts) from the microblog service and normalizes
//! them into [`TalkItem`]s. Videos, link cards and music arrive as a single
//! `extension` string whose meaning depends on `extension_type`.

use crate::config::Talks as TalksConfig;
use crate::markdown;
use crate::media::{Music, Video, VideoKind, Website};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, warn};

/// The response envelope. `code` is `1` on success; otherwise `msg` says
/// what went wrong.
#[derive(Deserialize, Debug)]
pub struct ApiResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<ApiData>,
}

#[derive(Deserialize, Debug)]
pub struct ApiData {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub items: Vec<ApiTalkItem>,
}

#[derive(Deserialize, Debug)]
pub struct ApiTalkItem {
    pub id: u64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub tags: Option<Vec<ApiTag>>,
    #[serde(default)]
    pub images: Option<Vec<ApiImage>>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub extension_type: Option<String>,
    #[serde(default)]
    pub fav_count: u64,
    pub created_at: String,
}

#[derive(Deserialize, Debug)]
pub struct ApiTag {
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct ApiImage {
    pub image_url: String,
}

/// The `WEBSITE` extension payload.
#[derive(Deserialize)]
struct WebsiteExtension {
    #[serde(default)]
    title: String,
    #[serde(default)]
    site: String,
    #[serde(default)]
    description: Option<String>,
}

/// A normalized talk.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TalkItem {
    pub id: u64,

    /// The talk body, in markdown. See [`TalkItem::html`].
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl TalkItem {
    /// Renders the talk body as HTML.
    pub fn html(&self) -> String {
        markdown::to_html(&self.text)
    }
}

/// YouTube video ids are always 11 characters; anything else is taken to be
/// a Bilibili id.
const YOUTUBE_ID_LEN: usize = 11;

const NETEASE_HOST: &str = "music.163.com";

static NETEASE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"id=(\d+)").unwrap());

/// Normalizes a response into talks. Fails only when the service reports an
/// error; a malformed extension drops that extension, not the talk.
pub fn normalize(response: ApiResponse) -> Result<Vec<TalkItem>> {
    if response.code != 1 {
        return Err(Error::Api(match response.msg.is_empty() {
            true => String::from("failed to get talks"),
            false => response.msg,
        }));
    }
    let data = response.data.ok_or(Error::MissingData)?;
    debug!(total = data.total, received = data.items.len(), "normalizing talks");
    Ok(data.items.into_iter().map(normalize_item).collect())
}

fn normalize_item(item: ApiTalkItem) -> TalkItem {
    let mut talk = TalkItem {
        id: item.id,
        text: item.content,
        date: item.created_at,
        tags: item
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.name)
            .collect(),
        images: item
            .images
            .map(|images| images.into_iter().map(|image| image.image_url).collect()),
        video: None,
        website: None,
        music: None,
        location: None,
    };

    let extension = match item.extension {
        Some(extension) if !extension.is_empty() => extension,
        _ => return talk,
    };
    match item.extension_type.as_deref() {
        Some("VIDEO") => talk.video = Some(video(extension)),
        Some("WEBSITE") => match serde_json::from_str::<WebsiteExtension>(&extension) {
            Ok(site) => {
                talk.website = Some(Website {
                    title: site.title,
                    url: site.site,
                    description: site.description,
                })
            }
            Err(e) => warn!(id = item.id, error = %e, "parsing website extension"),
        },
        Some("MUSIC") => talk.music = music(extension),
        other => debug!(id = item.id, extension_type = ?other, "ignoring extension"),
    }
    talk
}

fn video(extension: String) -> Video {
    match extension.chars().count() == YOUTUBE_ID_LEN {
        true => Video::new(VideoKind::Youtube, extension),
        false => Video::new(VideoKind::Bilibili, extension),
    }
}

/// NetEase Cloud Music links become a configured player when they carry an
/// `id=` parameter and are dropped otherwise; other URLs pass through.
fn music(url: String) -> Option<Music> {
    if !url.contains(NETEASE_HOST) {
        return Some(Music {
            url,
            ..Music::default()
        });
    }
    let id = NETEASE_ID.captures(&url)?.get(1)?.as_str().to_owned();
    Some(Music {
        url,
        id: Some(id),
        server: Some(String::from("netease")),
        kind: Some(String::from("song")),
        ..Music::default()
    })
}

/// Fetches and normalizes the talks. Any failure is logged and yields an
/// empty list.
pub fn fetch_talks(client: &Client, config: &TalksConfig) -> Vec<TalkItem> {
    match try_fetch_talks(client, config) {
        Ok(talks) => talks,
        Err(e) => {
            error!(endpoint = %config.endpoint, error = %e, "fetching talks");
            Vec::new()
        }
    }
}

fn try_fetch_talks(client: &Client, config: &TalksConfig) -> Result<Vec<TalkItem>> {
    let response: ApiResponse = client
        .get(config.endpoint.as_str())
        .send()?
        .error_for_status()?
        .json()?;
    normalize(response)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a failure fetching talks.
#[derive(Debug)]
pub enum Error {
    /// The service answered with a non-success `code`.
    Api(String),

    /// The service reported success without a `data` section.
    MissingData,

    /// Returned for transport, status and body-decoding errors.
    Http(reqwest::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Api(msg) => write!(f, "talks service error: {}", msg),
            Error::MissingData => write!(f, "talks response has no data"),
            Error::Http(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Api(_) => None,
            Error::MissingData => None,
            Error::Http(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    /// Converts a [`reqwest::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator on requests.
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_server::{client, serve_once, unreachable};
    use url::Url;

    fn fixture(items: &str) -> Vec<TalkItem> {
        let response: ApiResponse = serde_json::from_str(&format!(
            r#"{{"code": 1, "msg": "ok", "data": {{"total": 1, "items": [{}]}}}}"#,
            items
        ))
        .unwrap();
        normalize(response).unwrap()
    }

    fn item(extra: &str) -> String {
        format!(
            r#"{{"id": 7, "content": "hi", "username": "me", "layout": "", "private": false,
                "user_id": 1, "fav_count": 0, "created_at": "2025-11-28T09:30:00+08:00"{}}}"#,
            extra
        )
    }

    #[test]
    fn test_plain_talk() {
        let talks = fixture(&item(""));
        assert_eq!(
            vec![TalkItem {
                id: 7,
                text: String::from("hi"),
                date: String::from("2025-11-28T09:30:00+08:00"),
                images: None,
                video: None,
                website: None,
                music: None,
                tags: Vec::new(),
                location: None,
            }],
            talks
        );
    }

    #[test]
    fn test_tags_and_images() {
        let talks = fixture(&item(
            r#", "tags": [{"id": 1, "name": "life", "usage_count": 3, "created_at": ""}],
                "images": [{"id": 1, "message_id": 7, "image_url": "https://img/1.webp", "image_source": "url"}]"#,
        ));
        assert_eq!(vec![String::from("life")], talks[0].tags);
        assert_eq!(Some(vec![String::from("https://img/1.webp")]), talks[0].images);
    }

    #[test]
    fn test_youtube_video() {
        let talks = fixture(&item(r#", "extension": "dQw4w9WgXcQ", "extension_type": "VIDEO""#));
        assert_eq!(Some(Video::new(VideoKind::Youtube, "dQw4w9WgXcQ")), talks[0].video);
    }

    #[test]
    fn test_bilibili_video() {
        let talks = fixture(&item(r#", "extension": "BV1GJ411x7h7", "extension_type": "VIDEO""#));
        assert_eq!(Some(Video::new(VideoKind::Bilibili, "BV1GJ411x7h7")), talks[0].video);
    }

    #[test]
    fn test_website() {
        let talks = fixture(&item(
            r#", "extension": "{\"title\":\"Blog\",\"site\":\"https://blog.example.org\",\"description\":\"d\"}", "extension_type": "WEBSITE""#,
        ));
        assert_eq!(
            Some(Website {
                title: String::from("Blog"),
                url: String::from("https://blog.example.org"),
                description: Some(String::from("d")),
            }),
            talks[0].website
        );
    }

    #[test]
    fn test_malformed_website_is_dropped() {
        let talks = fixture(&item(r#", "extension": "not json", "extension_type": "WEBSITE""#));
        assert_eq!(1, talks.len());
        assert_eq!(None, talks[0].website);
    }

    #[test]
    fn test_netease_music() {
        let talks = fixture(&item(
            r#", "extension": "https://music.163.com/#/song?id=1901371647", "extension_type": "MUSIC""#,
        ));
        let music = talks[0].music.clone().unwrap();
        assert_eq!(Some(String::from("1901371647")), music.id);
        assert_eq!(Some(String::from("netease")), music.server);
        assert_eq!(Some(String::from("song")), music.kind);
    }

    #[test]
    fn test_netease_music_without_id() {
        let talks = fixture(&item(
            r#", "extension": "https://music.163.com/#/playlist", "extension_type": "MUSIC""#,
        ));
        assert_eq!(None, talks[0].music);
    }

    #[test]
    fn test_other_music() {
        let talks = fixture(&item(
            r#", "extension": "https://example.org/song.mp3", "extension_type": "MUSIC""#,
        ));
        assert_eq!(
            Some(Music {
                url: String::from("https://example.org/song.mp3"),
                ..Music::default()
            }),
            talks[0].music
        );
    }

    #[test]
    fn test_empty_extension_is_ignored() {
        let talks = fixture(&item(r#", "extension": "", "extension_type": "VIDEO""#));
        assert_eq!(None, talks[0].video);
    }

    #[test]
    fn test_api_error() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"code": 0, "msg": "denied", "data": null}"#).unwrap();
        match normalize(response) {
            Err(Error::Api(msg)) => assert_eq!("denied", msg),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    fn endpoint(base: &Url) -> TalksConfig {
        TalksConfig {
            endpoint: base.join("api/echo/page").unwrap(),
        }
    }

    const RESPONSE: &str = r#"{"code": 1, "msg": "ok", "data": {"total": 1, "items": [
        {"id": 7, "content": "hi", "created_at": "2025-11-28T09:30:00+08:00"}]}}"#;

    #[test]
    fn test_fetch_talks() {
        let (base, server) = serve_once("200 OK", RESPONSE);
        let talks = fetch_talks(&client(), &endpoint(&base));
        server.join().unwrap();
        assert_eq!(1, talks.len());
        assert_eq!(7, talks[0].id);
    }

    #[test]
    fn test_fetch_server_error_is_empty() {
        let (base, server) = serve_once("500 Internal Server Error", RESPONSE);
        let talks = fetch_talks(&client(), &endpoint(&base));
        server.join().unwrap();
        assert!(talks.is_empty());
    }

    #[test]
    fn test_fetch_malformed_body_is_empty() {
        let (base, server) = serve_once("200 OK", "<html>maintenance</html>");
        let talks = fetch_talks(&client(), &endpoint(&base));
        server.join().unwrap();
        assert!(talks.is_empty());
    }

    #[test]
    fn test_fetch_api_error_is_empty() {
        let (base, server) = serve_once("200 OK", r#"{"code": 0, "msg": "denied", "data": null}"#);
        let talks = fetch_talks(&client(), &endpoint(&base));
        server.join().unwrap();
        assert!(talks.is_empty());
    }

    #[test]
    fn test_fetch_unreachable_is_empty() {
        assert!(fetch_talks(&client(), &endpoint(&unreachable())).is_empty());
    }

    #[test]
    fn test_html() {
        let talks = fixture(&item(""));
        assert_eq!("<p>hi</p>\n", talks[0].html());
    }
}
