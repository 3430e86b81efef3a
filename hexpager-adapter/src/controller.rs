use std::ops::Range;

use crossbeam_channel::Receiver;
use hexpager::{LoadError, Page, PageEvent, PageLoad, Pager, PagerOptions, RowSource};

use crate::page_event_channel;

/// A framework-neutral controller that wraps a [`Pager`] and provides the
/// common presentation workflows: viewport-driven loading, placeholder row
/// slots, and anchor-preserving refresh.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_viewport(first_row, rows)` when the visible range changes
/// - `rows(..)` to materialize the visible slice (with placeholders)
/// - `refresh()` after the underlying data may have changed
pub struct Controller<S> {
    pager: Pager<S>,
}

impl<S: RowSource> Controller<S> {
    pub fn new(source: S, options: PagerOptions) -> Self {
        Self {
            pager: Pager::new(source, options),
        }
    }

    pub fn from_pager(pager: Pager<S>) -> Self {
        Self { pager }
    }

    pub fn pager(&self) -> &Pager<S> {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager<S> {
        &mut self.pager
    }

    pub fn into_pager(self) -> Pager<S> {
        self.pager
    }

    /// Call when the visible range changes: anchors the window at
    /// `first_row` and ensures every intersecting page is cached.
    pub fn on_viewport(&mut self, first_row: usize, rows: usize) -> Result<(), LoadError> {
        self.pager.set_anchor(first_row);
        self.pager
            .ensure_rows(first_row..first_row.saturating_add(rows))
    }

    /// The visible row slots. Unloaded rows come back as `None`
    /// (placeholders), so the result always has one entry per index in
    /// `range`.
    pub fn rows(&self, range: Range<usize>) -> Vec<Option<&[u8]>> {
        range.map(|i| self.pager.row(i)).collect()
    }

    /// Reloads around the anchor: drops the window and loads from the
    /// anchor-derived refresh key, or from page 0 when no key can be
    /// derived. `None` means the in-flight load was abandoned.
    pub fn refresh(&mut self) -> Result<Option<Page>, LoadError> {
        match self.pager.refresh()? {
            PageLoad::Complete(page) => Ok(Some(page)),
            PageLoad::Abandoned => Ok(None),
        }
    }

    /// Installs a channel-backed page-event subscription and returns the
    /// receiving side.
    ///
    /// Replaces any previously installed page-event callback.
    pub fn subscribe(&mut self) -> Receiver<PageEvent> {
        let (callback, receiver) = page_event_channel();
        self.pager.set_on_page_event(Some(callback));
        receiver
    }
}
