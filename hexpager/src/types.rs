/// Identifies a fixed-size page of rows: `key = row_index / page_size`.
///
/// Keys are non-negative by construction; page 0 is the default start page.
pub type PageKey = usize;

/// A contiguous block of rows produced by a single page load.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page {
    pub key: PageKey,
    /// Rows in ascending row-index order, immutable once produced. May be
    /// shorter than the page size near end of data, or empty for a terminal
    /// page.
    pub rows: Vec<Vec<u8>>,
    /// `key - 1`, or `None` when this is page 0 (no page exists before it).
    pub previous_key: Option<PageKey>,
    /// `key + 1`, or `None` when this page is terminal.
    pub next_key: Option<PageKey>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A terminal page fetched no rows: no data exists at or past its key.
    pub fn is_terminal(&self) -> bool {
        self.next_key.is_none()
    }

    /// The absolute index of the first row this page covers, given the page
    /// size it was loaded with.
    pub fn first_row(&self, page_size: usize) -> usize {
        self.key.saturating_mul(page_size)
    }
}

/// Lifecycle state of a page key inside the window.
///
/// `Terminal` and `Failed` are absorbing: range-driven loading skips such
/// keys until an explicit [`crate::Pager::load_page`] or
/// [`crate::Pager::refresh`] re-issues the load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageState {
    /// Never loaded, or evicted.
    Unloaded,
    /// Cached with at least one row.
    Loaded,
    /// Fetched and found empty; marks end of data.
    Terminal,
    /// The last load failed; retryable.
    Failed,
}

/// A notification fired by the pager when its window changes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageEvent {
    Loaded {
        key: PageKey,
        rows: usize,
        terminal: bool,
    },
    Evicted {
        key: PageKey,
    },
    Failed {
        key: PageKey,
    },
}
