//! Defines the [`Paginator`], which splits a list into fixed-size pages and
//! optionally keeps its current page in a URL query parameter.
//!
//! Nothing is cached: the total page count, the current page and the page's
//! items are derived from the source list and the query store on every read,
//! so a source that changes between reads (see [`ListSource::accessor`]) or a
//! URL edited behind the paginator's back is always reflected. Invalid pages,
//! whether requested by the caller or found in the URL, fall back to the
//! initial page.

use crate::config::Pagination;
use crate::page::{page_numbers, Page, PageLink};
use crate::query::{MemoryQuery, NavigationMode, QueryStore};
use std::borrow::Cow;

/// The page size used when neither the options nor the configuration set
/// one.
pub const DEFAULT_PER_PAGE: usize = 10;

/// The list being paginated.
pub enum ListSource<T> {
    /// A fixed list.
    Static(Vec<T>),

    /// A function producing the list. It is called on every read.
    Accessor(Box<dyn Fn() -> Vec<T>>),
}

impl<T: Clone> ListSource<T> {
    pub fn accessor<F: Fn() -> Vec<T> + 'static>(f: F) -> ListSource<T> {
        ListSource::Accessor(Box::new(f))
    }

    /// Reads the current contents of the list.
    pub fn read(&self) -> Cow<'_, [T]> {
        match self {
            ListSource::Static(items) => Cow::Borrowed(items),
            ListSource::Accessor(f) => Cow::Owned(f()),
        }
    }
}

impl<T> From<Vec<T>> for ListSource<T> {
    fn from(items: Vec<T>) -> ListSource<T> {
        ListSource::Static(items)
    }
}

/// Construction options for a [`Paginator`].
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// The starting page, and the fallback for any out-of-range page.
    pub initial_page: usize,

    /// Items per page. `None` (or zero) defers to the `pagination.per_page`
    /// configuration, then to [`DEFAULT_PER_PAGE`].
    pub per_page: Option<usize>,

    /// The query parameter holding the current page. `None` keeps the page in
    /// memory.
    pub bind_query: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            initial_page: 1,
            per_page: None,
            bind_query: None,
        }
    }
}

impl Options {
    pub fn initial_page(mut self, page: usize) -> Self {
        self.initial_page = page;
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn bind_query<S: Into<String>>(mut self, name: S) -> Self {
        self.bind_query = Some(name.into());
        self
    }
}

/// Paginates a [`ListSource`]. See the module documentation.
pub struct Paginator<T, Q = MemoryQuery> {
    list: ListSource<T>,
    initial_page: usize,
    per_page: usize,
    bind_query: Option<String>,
    store: Q,

    /// The page when unbound.
    current: usize,

    /// The page watchers were last told about.
    last_seen: usize,

    watchers: Vec<Box<dyn FnMut(usize)>>,
}

impl<T: Clone> Paginator<T, MemoryQuery> {
    /// Creates a paginator whose query binding, if any, lives in a
    /// [`MemoryQuery`].
    pub fn new<L: Into<ListSource<T>>>(
        list: L,
        options: Options,
        config: &Pagination,
    ) -> Paginator<T, MemoryQuery> {
        Paginator::with_store(list, options, config, MemoryQuery::default())
    }
}

impl<T: Clone, Q: QueryStore> Paginator<T, Q> {
    /// Creates a paginator that binds its page to `options.bind_query` in
    /// `store`. The store is unused when `bind_query` is `None`.
    pub fn with_store<L: Into<ListSource<T>>>(
        list: L,
        options: Options,
        config: &Pagination,
        store: Q,
    ) -> Paginator<T, Q> {
        let initial_page = std::cmp::max(options.initial_page, 1);
        let per_page = options
            .per_page
            .filter(|&n| n > 0)
            .or_else(|| config.per_page())
            .unwrap_or(DEFAULT_PER_PAGE);

        let mut paginator = Paginator {
            list: list.into(),
            initial_page,
            per_page,
            bind_query: options.bind_query,
            store,
            current: initial_page,
            last_seen: initial_page,
            watchers: Vec::new(),
        };
        paginator.last_seen = paginator.page();
        paginator
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn initial_page(&self) -> usize {
        self.initial_page
    }

    pub fn bind_query(&self) -> Option<&str> {
        self.bind_query.as_deref()
    }

    pub fn source(&self) -> &ListSource<T> {
        &self.list
    }

    /// Replaces the source list. The current page is re-validated against the
    /// new list on the next read.
    pub fn set_source<L: Into<ListSource<T>>>(&mut self, list: L) {
        self.list = list.into();
    }

    pub fn store(&self) -> &Q {
        &self.store
    }

    /// Mutable access to the query store, e.g. to replay browser navigation.
    /// Call [`Paginator::refresh`] afterwards to notify watchers.
    pub fn store_mut(&mut self) -> &mut Q {
        &mut self.store
    }

    fn pages_for(&self, len: usize) -> usize {
        match (len + self.per_page - 1) / self.per_page {
            0 => self.initial_page,
            n => n,
        }
    }

    /// The number of pages. An empty list reports `initial_page` pages.
    pub fn total_pages(&self) -> usize {
        self.pages_for(self.list.read().len())
    }

    fn accept(&self, page: usize, total: usize) -> usize {
        match page >= 1 && page <= total {
            true => page,
            false => self.initial_page,
        }
    }

    fn parse(&self, raw: &str, total: usize) -> usize {
        match parse_page(raw) {
            Some(page) => self.accept(page, total),
            None => self.initial_page,
        }
    }

    /// Converts a raw page value (e.g. from a URL) to a page number, falling
    /// back to `initial_page` unless it is an integer in
    /// `1..=total_pages()`.
    pub fn validate_page(&self, raw: &str) -> usize {
        self.parse(raw, self.total_pages())
    }

    fn page_within(&self, total: usize) -> usize {
        match &self.bind_query {
            Some(name) => match self.store.get(name) {
                Some(raw) => self.parse(&raw, total),
                None => self.initial_page,
            },
            None => self.accept(self.current, total),
        }
    }

    /// The current page. It is in `1..=total_pages()` unless `initial_page`
    /// is past the end, in which case every fallback lands on `initial_page`
    /// (e.g. 5 items, 10 per page and an initial page of 3 give page 3 of 1).
    pub fn page(&self) -> usize {
        self.page_within(self.total_pages())
    }

    /// How the next page change will be recorded: [`NavigationMode::Replace`]
    /// once the bound parameter is present in the URL, otherwise
    /// [`NavigationMode::Push`].
    pub fn mode(&self) -> NavigationMode {
        let present = match &self.bind_query {
            Some(name) => self.store.get(name).map_or(false, |v| !v.is_empty()),
            None => false,
        };
        match present {
            true => NavigationMode::Replace,
            false => NavigationMode::Push,
        }
    }

    /// Moves to `page`, or to `initial_page` if `page` is out of range. When
    /// bound, the page is written to the query parameter. The initial page is
    /// written too, so the parameter stays present and later changes replace
    /// the history entry.
    pub fn set_page(&mut self, page: usize) {
        let total = self.total_pages();
        let page = self.accept(page, total);
        if page == self.page_within(total) {
            return;
        }

        let mode = self.mode();
        match &self.bind_query {
            Some(name) => self.store.set(name, Some(&page.to_string()), mode),
            None => self.current = page,
        }
        self.refresh();
    }

    /// Like [`Paginator::set_page`], but for a raw value such as a form
    /// input.
    pub fn request_page(&mut self, raw: &str) {
        let page = self.validate_page(raw);
        self.set_page(page);
    }

    /// The items on the current page.
    pub fn list_paged(&self) -> Vec<T> {
        self.view().items
    }

    /// A snapshot of the current page. The source list is read once.
    pub fn view(&self) -> Page<T> {
        let items = self.list.read();
        let total = self.pages_for(items.len());
        let number = self.page_within(total);
        let start = std::cmp::min((number - 1).saturating_mul(self.per_page), items.len());
        let end = std::cmp::min(start.saturating_add(self.per_page), items.len());
        Page::new(items[start..end].to_vec(), number, total)
    }

    /// The page-number bar around the current page. See
    /// [`crate::page::page_numbers`].
    pub fn page_numbers(&self, expand: usize) -> Vec<PageLink> {
        let total = self.total_pages();
        page_numbers(self.page_within(total), total, expand)
    }

    /// Registers a callback run with the new page number whenever the page
    /// changes.
    pub fn watch<F: FnMut(usize) + 'static>(&mut self, f: F) {
        self.watchers.push(Box::new(f));
    }

    /// Re-reads the current page and notifies watchers if it moved since the
    /// last notification. Returns whether it moved.
    pub fn refresh(&mut self) -> bool {
        let page = self.page();
        if page == self.last_seen {
            return false;
        }
        self.last_seen = page;
        for watcher in self.watchers.iter_mut() {
            watcher(page);
        }
        true
    }
}

/// Parses a page number the way a URL parameter is read: surrounding
/// whitespace is ignored and any numeric spelling of a positive integer
/// (`"3"`, `"3.0"`, `"3e0"`) is accepted.
fn parse_page(raw: &str) -> Option<usize> {
    let n: f64 = raw.trim().parse().ok()?;
    match n.fract() == 0.0 && n >= 1.0 && n <= usize::MAX as f64 {
        true => Some(n as usize),
        false => None,
    }
}
