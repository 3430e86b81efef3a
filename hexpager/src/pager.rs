use std::collections::BTreeSet;
use std::ops::Range;

use crate::loader::{self, CancelToken, PageLoad};
use crate::window::PageWindow;
use crate::{
    LoadError, Page, PageEvent, PageEventCallback, PageKey, PageState, PagerOptions, RowSource,
};

/// The page window manager: drives a [`RowSource`] through fixed-size pages
/// and maintains a bounded window of cached pages.
///
/// This type is intentionally UI-agnostic and single-owner:
/// - The row source is passed in at construction; there is no ambient wiring.
/// - One consumer drives loads; the window is never mutated externally, so
///   the pager holds no locks.
/// - Presentation layers consume cached rows, the page-event callback, or
///   the pull-based [`Pager::pages_from`] iterator.
///
/// For viewport/refresh workflows and row formatting, see the
/// `hexpager-adapter` crate.
pub struct Pager<S> {
    source: S,
    options: PagerOptions,
    window: PageWindow,
    failed: BTreeSet<PageKey>,
    anchor: usize,
    cancel: CancelToken,
}

impl<S: RowSource> Pager<S> {
    /// Creates a pager over `source`.
    pub fn new(source: S, options: PagerOptions) -> Self {
        hdebug!(
            page_size = options.page_size,
            max_rows = options.max_rows,
            parallelism = options.parallelism,
            "Pager::new"
        );
        Self {
            source,
            options,
            window: PageWindow::new(),
            failed: BTreeSet::new(),
            anchor: 0,
            cancel: CancelToken::new(),
        }
    }

    pub fn options(&self) -> &PagerOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn set_on_page_event(&mut self, on_page_event: Option<PageEventCallback>) {
        self.options.on_page_event = on_page_event;
    }

    /// The anchor row: the viewport position driving eviction order and
    /// refresh-key derivation.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn set_anchor(&mut self, row: usize) {
        self.anchor = row;
    }

    /// A handle other threads can use to abandon the in-flight page load.
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn page_size(&self) -> usize {
        self.options.page_size.max(1)
    }

    fn notify(&self, event: PageEvent) {
        if let Some(cb) = &self.options.on_page_event {
            cb(&event);
        }
    }

    /// Loads (or reloads) the page at `key` and caches it.
    ///
    /// Clears any absorbing `Failed` state for the key first, so this is
    /// also the retry path after an error. Returns [`PageLoad::Abandoned`]
    /// with the window untouched when the cancel handle fired mid-load; the
    /// token is re-armed so the next load proceeds.
    ///
    /// With an unchanged source, loading the same key twice yields identical
    /// page contents both times.
    pub fn load_page(&mut self, key: PageKey) -> Result<PageLoad, LoadError> {
        self.failed.remove(&key);
        let page_size = self.page_size();
        let loaded = if self.options.parallelism > 1 {
            loader::load_page_parallel(
                &self.source,
                key,
                page_size,
                self.options.parallelism,
                Some(&self.cancel),
            )
        } else {
            loader::load_page(&self.source, key, page_size, Some(&self.cancel))
        };
        match loaded {
            Ok(PageLoad::Complete(page)) => {
                self.insert(page.clone());
                Ok(PageLoad::Complete(page))
            }
            Ok(PageLoad::Abandoned) => {
                self.cancel.reset();
                Ok(PageLoad::Abandoned)
            }
            Err(err) => {
                hwarn!(key, row = err.row_index(), "page load failed");
                self.failed.insert(key);
                self.notify(PageEvent::Failed { key });
                Err(err)
            }
        }
    }

    fn insert(&mut self, page: Page) {
        let key = page.key;
        let rows = page.len();
        let terminal = page.is_terminal();
        self.window.insert(page);
        self.notify(PageEvent::Loaded {
            key,
            rows,
            terminal,
        });
        let (max_rows, page_size, anchor) = (self.options.max_rows, self.page_size(), self.anchor);
        for key in self.window.evict_to_cap(max_rows, page_size, anchor) {
            htrace!(key, "page evicted");
            self.notify(PageEvent::Evicted { key });
        }
    }

    /// Ensures every page intersecting the row range is cached, loading the
    /// ones that are not.
    ///
    /// Keys in an absorbing state (`Terminal`, `Failed`) are skipped, as are
    /// keys at or past a known terminal page. Fails fast on the first load
    /// error; that key is marked `Failed` and already cached pages stay
    /// valid. Returns early (successfully) if the in-flight load is
    /// abandoned — the consumer has moved on.
    pub fn ensure_rows(&mut self, rows: Range<usize>) -> Result<(), LoadError> {
        if rows.is_empty() {
            return Ok(());
        }
        let page_size = self.page_size();
        let first_key = rows.start / page_size;
        let last_key = (rows.end - 1) / page_size;
        for key in first_key..=last_key {
            if self.window.contains(key) || self.failed.contains(&key) {
                continue;
            }
            if self.terminal_key().is_some_and(|t| key >= t) {
                continue;
            }
            match self.load_page(key)? {
                PageLoad::Complete(_) => {}
                PageLoad::Abandoned => return Ok(()),
            }
        }
        Ok(())
    }

    /// The lowest cached key known to be terminal, if any.
    pub fn terminal_key(&self) -> Option<PageKey> {
        self.window.iter().find(|p| p.is_terminal()).map(|p| p.key)
    }

    pub fn page(&self, key: PageKey) -> Option<&Page> {
        self.window.get(key)
    }

    /// Cached pages in ascending key order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.window.iter()
    }

    pub fn state(&self, key: PageKey) -> PageState {
        if self.failed.contains(&key) {
            return PageState::Failed;
        }
        match self.window.get(key) {
            Some(page) if page.is_terminal() => PageState::Terminal,
            Some(_) => PageState::Loaded,
            None => PageState::Unloaded,
        }
    }

    /// The cached row at `index`, if its page is loaded.
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        let page_size = self.page_size();
        let page = self.window.get(index / page_size)?;
        page.rows.get(index % page_size).map(Vec::as_slice)
    }

    pub fn cached_rows(&self) -> usize {
        self.window.cached_rows()
    }

    pub fn cached_pages(&self) -> usize {
        self.window.len()
    }

    /// The key to reload from after dropping the window: the cached page
    /// closest to the anchor yields `previous_key + 1`, else `next_key - 1`.
    ///
    /// `None` when the window is empty or only a lone terminal page 0
    /// remains; callers restart from page 0 in that case (which is what
    /// [`Pager::refresh`] does).
    pub fn refresh_key(&self) -> Option<PageKey> {
        self.window.refresh_key(self.page_size(), self.anchor)
    }

    /// Drops the whole window (and every absorbing mark), then reloads from
    /// [`Pager::refresh_key`], falling back to page 0.
    pub fn refresh(&mut self) -> Result<PageLoad, LoadError> {
        let key = self.refresh_key().unwrap_or(0);
        hdebug!(key, anchor = self.anchor, "refresh");
        let dropped: Vec<PageKey> = self.window.iter().map(|p| p.key).collect();
        self.window.clear();
        self.failed.clear();
        for key in dropped {
            self.notify(PageEvent::Evicted { key });
        }
        self.load_page(key)
    }

    /// A pull-based, restartable sequence of pages starting at `from`.
    ///
    /// Each `next()` loads through the cache and follows `next_key`; the
    /// terminal page is yielded, then the iterator ends. A fresh iterator
    /// can always be started after eviction — a load from any key is always
    /// possible.
    pub fn pages_from(&mut self, from: PageKey) -> PageIter<'_, S> {
        PageIter {
            pager: self,
            next_key: Some(from),
        }
    }
}

/// Iterator returned by [`Pager::pages_from`].
pub struct PageIter<'a, S> {
    pager: &'a mut Pager<S>,
    next_key: Option<PageKey>,
}

impl<S: RowSource> Iterator for PageIter<'_, S> {
    type Item = Result<Page, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next_key?;
        let page = match self.pager.page(key) {
            Some(page) => page.clone(),
            None => match self.pager.load_page(key) {
                Ok(PageLoad::Complete(page)) => page,
                Ok(PageLoad::Abandoned) => {
                    self.next_key = None;
                    return None;
                }
                Err(err) => {
                    self.next_key = None;
                    return Some(Err(err));
                }
            },
        };
        self.next_key = page.next_key;
        Some(Ok(page))
    }
}
