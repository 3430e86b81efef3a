use std::sync::Arc;

use crate::PageEvent;

/// A callback fired when the pager's window changes: a page loaded, was
/// evicted, or failed to load.
pub type PageEventCallback = Arc<dyn Fn(&PageEvent) + Send + Sync>;

/// Configuration for [`crate::Pager`].
///
/// This type is designed to be cheap to clone: the event callback is stored
/// in an `Arc` so adapters can tweak a field and rebuild a pager without
/// reallocating closures.
pub struct PagerOptions {
    /// Rows fetched per page load.
    pub page_size: usize,

    /// Cached-row cap for the window. When an insert pushes the total past
    /// it, pages farthest from the anchor are evicted first; the page
    /// containing the anchor is never evicted.
    pub max_rows: usize,

    /// Worker threads per page load. `1` fetches sequentially on the calling
    /// thread; higher values fan row fetches out over scoped threads.
    pub parallelism: usize,

    /// Optional callback fired on window changes.
    pub on_page_event: Option<PageEventCallback>,
}

impl PagerOptions {
    /// Creates options with the default geometry: 100 rows per page, 200
    /// cached rows, sequential fetching.
    pub fn new() -> Self {
        Self {
            page_size: 100,
            max_rows: 200,
            parallelism: 1,
            on_page_event: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        assert!(page_size > 0, "page_size must be non-zero");
        self.page_size = page_size;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        assert!(parallelism > 0, "parallelism must be non-zero");
        self.parallelism = parallelism;
        self
    }

    pub fn with_on_page_event(
        mut self,
        on_page_event: Option<impl Fn(&PageEvent) + Send + Sync + 'static>,
    ) -> Self {
        self.on_page_event = on_page_event.map(|f| Arc::new(f) as _);
        self
    }
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PagerOptions {
    fn clone(&self) -> Self {
        Self {
            page_size: self.page_size,
            max_rows: self.max_rows,
            parallelism: self.parallelism,
            on_page_event: self.on_page_event.clone(),
        }
    }
}

impl std::fmt::Debug for PagerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerOptions")
            .field("page_size", &self.page_size)
            .field("max_rows", &self.max_rows)
            .field("parallelism", &self.parallelism)
            .finish_non_exhaustive()
    }
}
