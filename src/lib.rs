//! The library code behind the blog's list pages. The site shows several
//! lists (talks, Mastodon statuses, sponsors, the skill wall) and every one of
//! them is paged the same way:
//!
//! 1. Obtain the list, either from a content file ([`crate::content`]) or
//!    from a third-party service ([`crate::talks`], [`crate::mastodon`])
//! 2. Hand it to a [`paginator::Paginator`], which derives the page count,
//!    the current page and that page's items
//!
//! The current page can be bound to a URL query parameter through a
//! [`query::QueryStore`], so a page survives reloads and can be linked to.
//! The first page change on a URL without the parameter pushes a new history
//! entry and later changes replace it, so "back" from any page returns to the
//! unpaginated URL in one step.
//!
//! The service fetchers never fail: any problem is logged and an empty list is
//! returned, which pages like any other empty list. The GitHub repo lookup
//! ([`crate::github`]) is the exception, since its caller needs the upstream
//! status.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod content;
pub mod github;
pub mod markdown;
pub mod mastodon;
pub mod media;
pub mod page;
pub mod paginator;
pub mod query;
pub mod talks;
pub mod util;

#[cfg(test)]
mod test_server;
