//! Loads the site configuration from a `blog.yaml` project file. The project
//! file is found by walking up from a starting directory, so the CLI can be
//! run from anywhere inside the project.

use crate::util::open;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "blog.yaml";

const DEFAULT_TALKS_ENDPOINT: &str = "https://ech0.050815.xyz/api/echo/page";
const DEFAULT_SHOWN_MAX: usize = 30;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub homepage: Option<Url>,
}

/// The `pagination` section. `per_page` is optional; an unset or zero value
/// leaves the choice to [`crate::paginator::Paginator`].
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Pagination {
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl Pagination {
    /// Returns the configured page size, treating `0` as unset.
    pub fn per_page(&self) -> Option<usize> {
        self.per_page.filter(|&n| n > 0)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Talks {
    #[serde(default = "default_talks_endpoint")]
    pub endpoint: Url,
}

impl Default for Talks {
    fn default() -> Self {
        Talks {
            endpoint: default_talks_endpoint(),
        }
    }
}

fn default_talks_endpoint() -> Url {
    // constant, always parses
    Url::parse(DEFAULT_TALKS_ENDPOINT).unwrap()
}

/// The `mastodon` section. `token_env` names the environment variable holding
/// the access token so the token itself never lives in the project file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Mastodon {
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default = "default_shown_max")]
    pub shown_max: usize,
    #[serde(default = "default_mastodon_token_env")]
    pub token_env: String,
}

impl Default for Mastodon {
    fn default() -> Self {
        Mastodon {
            instance: String::new(),
            user_id: String::new(),
            tag: String::new(),
            shown_max: DEFAULT_SHOWN_MAX,
            token_env: default_mastodon_token_env(),
        }
    }
}

impl Mastodon {
    /// Reads the access token from the environment. An empty variable counts
    /// as no token.
    pub fn token(&self) -> Option<String> {
        env_token(&self.token_env)
    }
}

fn default_shown_max() -> usize {
    DEFAULT_SHOWN_MAX
}

fn default_mastodon_token_env() -> String {
    String::from("MASTODON_TOKEN")
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Github {
    #[serde(default = "default_github_token_env")]
    pub token_env: String,
}

impl Default for Github {
    fn default() -> Self {
        Github {
            token_env: default_github_token_env(),
        }
    }
}

impl Github {
    pub fn token(&self) -> Option<String> {
        env_token(&self.token_env)
    }
}

fn default_github_token_env() -> String {
    String::from("GITHUB_TOKEN")
}

fn env_token(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|t| !t.is_empty())
}

#[derive(Deserialize)]
struct Project {
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    description: String,
    url: Url,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    content_directory: Option<PathBuf>,
    #[serde(default)]
    pagination: Pagination,
    #[serde(default)]
    talks: Talks,
    #[serde(default)]
    mastodon: Mastodon,
    #[serde(default)]
    github: Github,
}

fn default_language() -> String {
    String::from("zh-CN")
}

/// The resolved site configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub url: Url,
    pub language: String,
    pub timezone: Option<String>,
    pub author: Option<Author>,

    /// The directory holding the static content lists (`sponsors.yaml`,
    /// `creativity.yaml`). Defaults to `{project_root}/content`.
    pub content_directory: PathBuf,

    pub pagination: Pagination,
    pub talks: Talks,
    pub mastodon: Mastodon,
    pub github: Github,
}

impl Config {
    /// Searches `dir` and each of its ancestors for a [`PROJECT_FILE`] and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config::resolve(project, project_root)),
        }
    }

    /// Parses a project file's contents. Relative paths resolve against
    /// `project_root`.
    pub fn from_yaml(input: &str, project_root: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_str(input)?;
        Ok(Config::resolve(project, project_root))
    }

    fn resolve(project: Project, project_root: &Path) -> Config {
        Config {
            title: project.title,
            subtitle: project.subtitle,
            description: project.description,
            url: project.url,
            language: project.language,
            timezone: project.timezone,
            author: project.author,
            content_directory: project_root.join(
                project
                    .content_directory
                    .unwrap_or_else(|| PathBuf::from("content")),
            ),
            pagination: project.pagination,
            talks: project.talks,
            mastodon: project.mastodon,
            github: project.github,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_minimal_project() -> Result<()> {
        let config = Config::from_yaml(
            "title: ZSX\nurl: https://blog.example.org/\n",
            Path::new("/srv/blog"),
        )?;
        assert_eq!("ZSX", config.title);
        assert_eq!("zh-CN", config.language);
        assert_eq!(PathBuf::from("/srv/blog/content"), config.content_directory);
        assert_eq!(None, config.pagination.per_page());
        assert_eq!(30, config.mastodon.shown_max);
        assert_eq!("MASTODON_TOKEN", config.mastodon.token_env);
        assert_eq!("GITHUB_TOKEN", config.github.token_env);
        assert_eq!(DEFAULT_TALKS_ENDPOINT, config.talks.endpoint.as_str());
        Ok(())
    }

    #[test]
    fn test_full_project() -> Result<()> {
        let config = Config::from_yaml(
            r#"
title: ZSX
subtitle: sub
url: https://blog.example.org/
timezone: Asia/Shanghai
author:
  name: someone
  email: me@example.org
content_directory: data
pagination:
  per_page: 12
talks:
  endpoint: https://talks.example.org/api/echo/page
mastodon:
  instance: social.example.org
  user_id: "42"
  shown_max: 5
"#,
            Path::new("/srv/blog"),
        )?;
        assert_eq!(Some(12), config.pagination.per_page());
        assert_eq!(PathBuf::from("/srv/blog/data"), config.content_directory);
        assert_eq!("social.example.org", config.mastodon.instance);
        assert_eq!("42", config.mastodon.user_id);
        assert_eq!(5, config.mastodon.shown_max);
        assert_eq!(Some(String::from("Asia/Shanghai")), config.timezone);
        assert_eq!(
            Some(String::from("me@example.org")),
            config.author.and_then(|a| a.email)
        );
        Ok(())
    }

    #[test]
    fn test_from_directory_walks_up() -> Result<()> {
        let config = Config::from_directory(Path::new("demo/content"))?;
        assert_eq!("https://blog.mcyzsx.top/", config.url.as_str());
        assert_eq!(Some(10), config.pagination.per_page());
        assert_eq!(PathBuf::from("demo/content"), config.content_directory);
        Ok(())
    }

    #[test]
    fn test_zero_per_page_is_unset() {
        let pagination = Pagination { per_page: Some(0) };
        assert_eq!(None, pagination.per_page());
    }

    #[test]
    fn test_missing_title_fails() {
        assert!(Config::from_yaml("url: https://blog.example.org/\n", Path::new("/")).is_err());
    }
}
