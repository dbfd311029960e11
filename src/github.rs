//! Looks up GitHub repository metadata for the repo cards shown in posts.
//! Unlike the content feeds, failures here are returned to the caller with
//! an HTTP status, so a proxy in front of it can pass GitHub's own errors
//! (404 for a missing repo, 403 when rate limited) straight through.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

const API_BASE: &str = "https://api.github.com";

/// The `Cache-Control` value for proxied repo lookups: five minutes in
/// shared caches, then one minute of stale-while-revalidate.
pub const CACHE_CONTROL: &str = "s-maxage=300, stale-while-revalidate=60";

/// GitHub rejects requests without a user agent.
const CLIENT_USER_AGENT: &str = concat!("zsx-site/", env!("CARGO_PKG_VERSION"));

static GITHUB_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://github\.com/").unwrap());

#[derive(Deserialize)]
struct ApiRepo {
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
}

/// The fields a repo card displays.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepoSummary {
    /// `owner/name`.
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: u64,
}

impl ApiRepo {
    fn summarize(self) -> RepoSummary {
        RepoSummary {
            name: self.full_name,
            description: self.description,
            url: self.html_url,
            stars: self.stargazers_count,
        }
    }
}

/// Reduces a repo reference to `owner/name`, accepting full
/// `https://github.com/owner/name/` URLs.
pub fn clean_repo(raw: &str) -> Result<String> {
    let stripped = GITHUB_PREFIX.replace(raw.trim(), "");
    let repo = stripped.strip_suffix('/').unwrap_or(&*stripped);
    match repo.is_empty() {
        true => Err(Error::MissingRepo),
        false => Ok(repo.to_owned()),
    }
}

/// Fetches the summary for `repo`. `token` is sent as a GitHub token when
/// present, which raises the rate limit.
pub fn fetch_repo(client: &Client, repo: &str, token: Option<&str>) -> Result<RepoSummary> {
    let repo = clean_repo(repo)?;
    let mut request = client
        .get(&format!("{}/repos/{}", API_BASE, repo))
        .header(USER_AGENT, CLIENT_USER_AGENT)
        .header(ACCEPT, "application/vnd.github+json");
    if let Some(token) = token {
        request = request.header("Authorization", format!("token {}", token));
    }

    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        warn!(repo = %repo, status = status.as_u16(), "GitHub lookup failed");
        return Err(Error::Upstream {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("GitHub API Error")
                .to_owned(),
        });
    }
    let summary = response.json::<ApiRepo>()?.summarize();
    debug!(repo = %summary.name, stars = summary.stars, "fetched GitHub repo");
    Ok(summary)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a failed repo lookup.
#[derive(Debug)]
pub enum Error {
    /// Returned when no repo was given.
    MissingRepo,

    /// Returned when GitHub answered with a non-success status.
    Upstream { status: u16, reason: String },

    /// Returned for transport and body-decoding errors.
    Http(reqwest::Error),
}

impl Error {
    /// The HTTP status a proxy should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingRepo => 400,
            Error::Upstream { status, .. } => *status,
            Error::Http(err) => err.status().map_or(500, |s| s.as_u16()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingRepo => write!(f, "Missing repo parameter"),
            Error::Upstream { status, reason } => write!(f, "{} {}", status, reason),
            Error::Http(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingRepo => None,
            Error::Upstream { .. } => None,
            Error::Http(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}
