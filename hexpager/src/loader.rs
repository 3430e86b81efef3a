use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use snafu::ResultExt;

use crate::error::RowFetchSnafu;
use crate::{LoadError, Page, PageKey, RowSource};

/// A cloneable cancellation flag checked at row-fetch boundaries.
///
/// Cancelling does not interrupt a fetch already in flight; it stops the page
/// load at the next boundary and the partial page is discarded, never
/// surfaced.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Re-arms the token so the next load can proceed.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }
}

/// Outcome of a page load that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageLoad {
    /// Every row fetch completed; the page is ready.
    Complete(Page),
    /// The cancel token fired mid-load; partial rows were discarded.
    Abandoned,
}

/// Loads the page at `key`: fetches `page_size` consecutive rows starting at
/// `key * page_size`, in ascending index order, dropping empty results.
///
/// `previous_key` is `key - 1` unless `key` is 0. `next_key` is `key + 1`
/// unless the page came back with no rows at all, which marks it terminal.
/// Any fetch error fails the whole load.
pub fn load_page<S: RowSource + ?Sized>(
    source: &S,
    key: PageKey,
    page_size: usize,
    cancel: Option<&CancelToken>,
) -> Result<PageLoad, LoadError> {
    let first = key.saturating_mul(page_size);
    match fetch_span(source, first, first.saturating_add(page_size), cancel)? {
        Some(rows) => Ok(PageLoad::Complete(page_from_rows(key, rows))),
        None => {
            hdebug!(key, "page load abandoned");
            Ok(PageLoad::Abandoned)
        }
    }
}

/// Loads the page at `key`, fanning row fetches out over up to `parallelism`
/// scoped worker threads (the row source must tolerate concurrent fetches,
/// which its `Sync` bound guarantees).
///
/// The call is a barrier: it returns only once every fetch has completed or
/// one has failed. Rows come back in ascending index order regardless of
/// completion order, and the error of the lowest-indexed failing chunk wins.
pub fn load_page_parallel<S: RowSource + ?Sized>(
    source: &S,
    key: PageKey,
    page_size: usize,
    parallelism: usize,
    cancel: Option<&CancelToken>,
) -> Result<PageLoad, LoadError> {
    let workers = parallelism.max(1).min(page_size.max(1));
    if workers <= 1 {
        return load_page(source, key, page_size, cancel);
    }

    let first = key.saturating_mul(page_size);
    let chunk = page_size.div_ceil(workers);
    htrace!(key, workers, chunk, "parallel page load");

    // One contiguous index chunk per worker keeps reassembly a plain
    // in-order concatenation.
    let chunks = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for w in 0..workers {
            let start = first.saturating_add(w.saturating_mul(chunk));
            let end = first
                .saturating_add(page_size)
                .min(start.saturating_add(chunk));
            handles.push(scope.spawn(move || fetch_span(source, start, end, cancel)));
        }
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect::<Vec<_>>()
    });

    let mut rows = Vec::with_capacity(page_size);
    for fetched in chunks {
        match fetched? {
            Some(mut span) => rows.append(&mut span),
            None => {
                hdebug!(key, "page load abandoned");
                return Ok(PageLoad::Abandoned);
            }
        }
    }
    Ok(PageLoad::Complete(page_from_rows(key, rows)))
}

/// Fetches `start..end`, filtering out empty rows. `None` means the cancel
/// token fired before the span completed.
fn fetch_span<S: RowSource + ?Sized>(
    source: &S,
    start: usize,
    end: usize,
    cancel: Option<&CancelToken>,
) -> Result<Option<Vec<Vec<u8>>>, LoadError> {
    let mut rows = Vec::with_capacity(end.saturating_sub(start));
    for index in start..end {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Ok(None);
        }
        let row = source.fetch_row(index).context(RowFetchSnafu { index })?;
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(Some(rows))
}

fn page_from_rows(key: PageKey, rows: Vec<Vec<u8>>) -> Page {
    let previous_key = if key > 0 { Some(key - 1) } else { None };
    let next_key = if rows.is_empty() { None } else { Some(key + 1) };
    htrace!(
        key,
        rows = rows.len(),
        terminal = next_key.is_none(),
        "page loaded"
    );
    Page {
        key,
        rows,
        previous_key,
        next_key,
    }
}
