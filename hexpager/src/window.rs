use std::collections::BTreeMap;

use crate::{Page, PageKey};

/// The bounded, ordered set of currently cached pages.
///
/// Only the owning pager mutates it, so no locking is needed. Bounds and
/// eviction order follow the anchor row: pages farthest from the anchor go
/// first, and the page intersecting the anchor never goes.
#[derive(Clone, Debug, Default)]
pub(crate) struct PageWindow {
    pages: BTreeMap<PageKey, Page>,
    cached_rows: usize,
}

impl PageWindow {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: PageKey) -> Option<&Page> {
        self.pages.get(&key)
    }

    pub(crate) fn contains(&self, key: PageKey) -> bool {
        self.pages.contains_key(&key)
    }

    pub(crate) fn cached_rows(&self) -> usize {
        self.cached_rows
    }

    pub(crate) fn len(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    pub(crate) fn clear(&mut self) {
        self.pages.clear();
        self.cached_rows = 0;
    }

    pub(crate) fn insert(&mut self, page: Page) {
        let key = page.key;
        let added = page.len();
        if let Some(old) = self.pages.insert(key, page) {
            self.cached_rows = self.cached_rows.saturating_sub(old.len());
        }
        self.cached_rows = self.cached_rows.saturating_add(added);
    }

    pub(crate) fn remove(&mut self, key: PageKey) -> Option<Page> {
        let removed = self.pages.remove(&key);
        if let Some(page) = &removed {
            self.cached_rows = self.cached_rows.saturating_sub(page.len());
        }
        removed
    }

    /// Evicts farthest-from-anchor pages until the cached-row total is back
    /// under `max_rows`, returning the evicted keys.
    ///
    /// The page intersecting `anchor_row` is never evicted, even when it
    /// alone exceeds the cap. Terminal (empty) pages hold no rows and are
    /// left alone; they only mark end of data.
    pub(crate) fn evict_to_cap(
        &mut self,
        max_rows: usize,
        page_size: usize,
        anchor_row: usize,
    ) -> Vec<PageKey> {
        let mut evicted = Vec::new();
        while self.cached_rows > max_rows {
            let victim = self
                .pages
                .values()
                .filter(|p| !p.is_empty() && !page_contains(p, page_size, anchor_row))
                .max_by_key(|p| page_distance(p, page_size, anchor_row))
                .map(|p| p.key);
            let Some(key) = victim else { break };
            self.remove(key);
            evicted.push(key);
        }
        evicted
    }

    /// The cached page closest to `anchor_row`. A page containing the anchor
    /// (boundaries included) wins outright; otherwise minimal row distance,
    /// lower key on a tie.
    pub(crate) fn closest_page(&self, page_size: usize, anchor_row: usize) -> Option<&Page> {
        self.pages
            .values()
            .min_by_key(|p| page_distance(p, page_size, anchor_row))
    }

    /// Derives the key to reload from once the window is dropped: the
    /// closest page's `previous_key + 1`, else its `next_key - 1`. `None`
    /// means the caller should restart from the default start page.
    pub(crate) fn refresh_key(&self, page_size: usize, anchor_row: usize) -> Option<PageKey> {
        let closest = self.closest_page(page_size, anchor_row)?;
        closest
            .previous_key
            .map(|prev| prev + 1)
            .or_else(|| closest.next_key.map(|next| next.saturating_sub(1)))
    }
}

/// First and last row index a page occupies. A terminal (empty) page still
/// occupies its key's first slot for distance purposes.
fn page_row_span(page: &Page, page_size: usize) -> (usize, usize) {
    let first = page.first_row(page_size);
    let len = page.len().max(1);
    (first, first + len - 1)
}

fn page_contains(page: &Page, page_size: usize, row: usize) -> bool {
    let (first, last) = page_row_span(page, page_size);
    (first..=last).contains(&row)
}

fn page_distance(page: &Page, page_size: usize, row: usize) -> usize {
    let (first, last) = page_row_span(page, page_size);
    if row < first {
        first - row
    } else if row > last {
        row - last
    } else {
        0
    }
}
