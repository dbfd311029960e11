//! The derived views a [`crate::paginator::Paginator`] hands out: a [`Page`]
//! of items and the [`PageLink`]s for a page-number bar.

use serde::Serialize;
use std::fmt;

/// One page of a paginated list. Page numbers are 1-based.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    /// The items on this page, in source order.
    pub items: Vec<T>,

    /// The page number.
    pub number: usize,

    /// The total number of pages.
    pub total: usize,

    /// The previous page number, if any.
    pub prev: Option<usize>,

    /// The next page number, if any.
    pub next: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: usize, total: usize) -> Page<T> {
        Page {
            items,
            number,
            total,
            prev: match number > 1 {
                true => Some(number - 1),
                false => None,
            },
            next: match number < total {
                true => Some(number + 1),
                false => None,
            },
        }
    }
}

/// An entry in a page-number bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageLink {
    Number(usize),

    /// One or more elided page numbers.
    Gap,
}

impl fmt::Display for PageLink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PageLink::Number(n) => write!(f, "{}", n),
            PageLink::Gap => write!(f, "…"),
        }
    }
}

/// Builds a page-number bar: the pages within `expand` of `current`, plus
/// the first and last pages, with a [`PageLink::Gap`] wherever pages are
/// skipped. No page number appears twice and a gap never stands in for zero
/// pages.
pub fn page_numbers(current: usize, total: usize, expand: usize) -> Vec<PageLink> {
    let left = std::cmp::max(1, current.saturating_sub(expand));
    let right = std::cmp::min(total, current.saturating_add(expand));

    let mut links = Vec::new();
    if left > 1 {
        links.push(PageLink::Number(1));
    }
    if left > 2 {
        links.push(PageLink::Gap);
    }
    links.extend((left..=right).map(PageLink::Number));
    if right.saturating_add(1) < total {
        links.push(PageLink::Gap);
    }
    if right < total {
        links.push(PageLink::Number(total));
    }
    links
}
