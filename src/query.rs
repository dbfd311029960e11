//! Defines the [`QueryStore`] trait, through which a
//! [`crate::paginator::Paginator`] mirrors its current page into a URL query
//! parameter, and [`UrlHistory`], an in-memory model of a browser's history
//! stack that implements it.

use std::collections::HashMap;
use std::fmt;
use url::{ParseError, Url};

/// How a URL change is recorded in the navigation history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationMode {
    /// Append a new history entry; "back" returns to the previous URL.
    Push,

    /// Overwrite the current history entry.
    Replace,
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NavigationMode::Push => write!(f, "push"),
            NavigationMode::Replace => write!(f, "replace"),
        }
    }
}

/// Read/write access to the query parameters of the active URL.
pub trait QueryStore {
    /// Returns the value of the parameter `name` in the active URL, if any.
    fn get(&self, name: &str) -> Option<String>;

    /// Sets the parameter `name` to `value`, or removes it when `value` is
    /// `None`, recording the change according to `mode`.
    fn set(&mut self, name: &str, value: Option<&str>, mode: NavigationMode);
}

impl<Q: QueryStore + ?Sized> QueryStore for &mut Q {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: Option<&str>, mode: NavigationMode) {
        (**self).set(name, value, mode)
    }
}

/// A query store with no URL behind it. Navigation modes are ignored.
#[derive(Clone, Debug, Default)]
pub struct MemoryQuery(HashMap<String, String>);

impl QueryStore for MemoryQuery {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: Option<&str>, _mode: NavigationMode) {
        match value {
            Some(value) => {
                self.0.insert(name.to_owned(), value.to_owned());
            }
            None => {
                self.0.remove(name);
            }
        }
    }
}

/// A linear navigation history. `entries()[position]` is the active URL;
/// entries after it are reachable with [`UrlHistory::forward`] until the next
/// push discards them.
#[derive(Clone, Debug)]
pub struct UrlHistory {
    entries: Vec<Url>,
    position: usize,
}

impl UrlHistory {
    pub fn new(url: Url) -> UrlHistory {
        UrlHistory {
            entries: vec![url],
            position: 0,
        }
    }

    pub fn parse(url: &str) -> Result<UrlHistory, ParseError> {
        Ok(UrlHistory::new(Url::parse(url)?))
    }

    /// The active URL.
    pub fn current(&self) -> &Url {
        &self.entries[self.position]
    }

    pub fn entries(&self) -> &[Url] {
        &self.entries
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Steps back one entry. Returns `false` at the start of the history.
    pub fn back(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        true
    }

    /// Steps forward one entry. Returns `false` at the end of the history.
    pub fn forward(&mut self) -> bool {
        if self.position + 1 >= self.entries.len() {
            return false;
        }
        self.position += 1;
        true
    }

    /// Navigates to `url` as if the user had typed it in.
    pub fn navigate(&mut self, url: Url) {
        self.record(url, NavigationMode::Push);
    }

    fn record(&mut self, url: Url, mode: NavigationMode) {
        match mode {
            NavigationMode::Push => {
                self.entries.truncate(self.position + 1);
                self.entries.push(url);
                self.position += 1;
            }
            NavigationMode::Replace => self.entries[self.position] = url,
        }
    }
}

/// Returns a copy of `url` with the parameter `name` set to `value` (or
/// removed). Other parameters keep their order; an existing `name` keeps its
/// position.
fn with_param(url: &Url, name: &str, value: Option<&str>) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut found = false;
    for (k, v) in url.query_pairs() {
        if k == name {
            if let (false, Some(value)) = (found, value) {
                pairs.push((k.into_owned(), value.to_owned()));
            }
            found = true;
        } else {
            pairs.push((k.into_owned(), v.into_owned()));
        }
    }
    if let (false, Some(value)) = (found, value) {
        pairs.push((name.to_owned(), value.to_owned()));
    }

    let mut url = url.clone();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url
}

impl QueryStore for UrlHistory {
    fn get(&self, name: &str) -> Option<String> {
        self.current()
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    fn set(&mut self, name: &str, value: Option<&str>, mode: NavigationMode) {
        let url = with_param(self.current(), name, value);
        self.record(url, mode);
    }
}
