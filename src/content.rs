//! The hand-maintained content lists: sponsors and the "creativity" skill
//! wall. Each lives in its own YAML file under the content directory.

use crate::util::open;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const SPONSORS_FILE: &str = "sponsors.yaml";
pub const CREATIVITY_FILE: &str = "creativity.yaml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Sponsor {
    pub name: String,

    /// An avatar URL. Sponsors without one get a generated placeholder.
    #[serde(default)]
    pub avatar: Option<String>,
    pub date: String,

    /// The amount as displayed, currency included (e.g. `100 ￥`).
    pub amount: String,
}

#[derive(Deserialize, Default)]
struct SponsorFile {
    #[serde(default)]
    sponsors: Vec<Sponsor>,
}

/// A category on the skill wall.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct CreativityGroup {
    pub class_name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub creativity_list: Vec<CreativityItem>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct CreativityItem {
    pub name: String,

    /// A CSS color for the tile background.
    pub color: String,

    /// The icon URL.
    pub icon: String,
}

fn load<T: DeserializeOwned + Default>(path: &Path, kind: &str) -> Result<T> {
    if !path.exists() {
        debug!(path = %path.display(), "no {} file", kind);
        return Ok(T::default());
    }
    Ok(serde_yaml::from_reader(open(path, kind)?)?)
}

/// Loads `sponsors.yaml` from `content_directory`. A missing file means no
/// sponsors.
pub fn load_sponsors(content_directory: &Path) -> Result<Vec<Sponsor>> {
    let file: SponsorFile = load(&content_directory.join(SPONSORS_FILE), "sponsors")?;
    Ok(file.sponsors)
}

/// Loads `creativity.yaml` from `content_directory`. A missing file means an
/// empty wall.
pub fn load_creativity(content_directory: &Path) -> Result<Vec<CreativityGroup>> {
    load(&content_directory.join(CREATIVITY_FILE), "creativity")
}
