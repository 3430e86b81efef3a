use crate::*;

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Bytes 0, 1, 2, ... chunked into `row_len`-byte rows.
fn byte_source(total_bytes: usize, row_len: usize) -> SliceSource {
    let bytes: Vec<u8> = (0..total_bytes).map(|i| i as u8).collect();
    SliceSource::new(bytes, row_len)
}

fn complete(load: PageLoad) -> Page {
    match load {
        PageLoad::Complete(page) => page,
        PageLoad::Abandoned => panic!("page load was abandoned"),
    }
}

/// Counts fetches while delegating to the wrapped source.
struct CountingSource<S> {
    inner: S,
    fetches: AtomicUsize,
}

impl<S> CountingSource<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl<S: RowSource> RowSource for CountingSource<S> {
    fn fetch_row(&self, index: usize) -> io::Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.inner.fetch_row(index)
    }
}

#[test]
fn full_page_links_prev_and_next_keys() {
    let src = byte_source(64, 2); // 32 rows

    let p0 = complete(load_page(&src, 0, 4, None).unwrap());
    assert_eq!(p0.key, 0);
    assert_eq!(p0.len(), 4);
    assert_eq!(p0.previous_key, None);
    assert_eq!(p0.next_key, Some(1));
    assert_eq!(p0.rows, vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]]);

    let p3 = complete(load_page(&src, 3, 4, None).unwrap());
    assert_eq!(p3.previous_key, Some(2));
    assert_eq!(p3.next_key, Some(4));
}

#[test]
fn empty_fetch_marks_page_terminal() {
    let src = byte_source(8, 2); // 4 rows, page 1 is past the end

    let p1 = complete(load_page(&src, 1, 4, None).unwrap());
    assert!(p1.is_empty());
    assert!(p1.is_terminal());
    assert_eq!(p1.previous_key, Some(0));
    assert_eq!(p1.next_key, None);
}

#[test]
fn partial_tail_page_keeps_next_key() {
    let src = byte_source(20, 2); // 10 rows: page 2 holds rows 8..10

    let p2 = complete(load_page(&src, 2, 4, None).unwrap());
    assert_eq!(p2.len(), 2);
    assert_eq!(p2.next_key, Some(3));

    // The page after the partial tail is the terminal one.
    let p3 = complete(load_page(&src, 3, 4, None).unwrap());
    assert!(p3.is_terminal());
}

#[test]
fn load_page_is_idempotent() {
    let src = byte_source(32, 2);
    let a = complete(load_page(&src, 1, 4, None).unwrap());
    let b = complete(load_page(&src, 1, 4, None).unwrap());
    assert_eq!(a, b);

    let mut pager = Pager::new(src, PagerOptions::new().with_page_size(4));
    let a = complete(pager.load_page(1).unwrap());
    let b = complete(pager.load_page(1).unwrap());
    assert_eq!(a, b);
}

#[test]
fn window_never_exceeds_row_cap() {
    let mut pager = Pager::new(
        byte_source(40, 2), // 20 rows
        PagerOptions::new().with_page_size(2).with_max_rows(4),
    );
    for key in 0..8 {
        pager.load_page(key).unwrap();
        assert!(pager.cached_rows() <= 4, "cap exceeded at key {key}");
    }
    // The anchor's page is always among the survivors.
    assert!(pager.page(0).is_some());
}

#[test]
fn eviction_drops_farthest_page_and_keeps_anchor() {
    let mut pager = Pager::new(
        byte_source(40, 2),
        PagerOptions::new().with_page_size(2).with_max_rows(4),
    );
    pager.load_page(0).unwrap();
    pager.load_page(1).unwrap();
    // Anchor sits in page 0, so the newly loaded page 2 is the farthest.
    pager.load_page(2).unwrap();
    assert!(pager.page(0).is_some());
    assert!(pager.page(1).is_some());
    assert!(pager.page(2).is_none());

    // Move the anchor into page 2: now page 0 goes first.
    pager.set_anchor(5);
    pager.load_page(2).unwrap();
    assert!(pager.page(0).is_none());
    assert!(pager.page(1).is_some());
    assert!(pager.page(2).is_some());
}

#[test]
fn refresh_key_prefers_previous_key_plus_one() {
    let mut pager = Pager::new(
        byte_source(24, 2), // 12 rows = pages {0, 1, 2} at page_size 4
        PagerOptions::new().with_page_size(4),
    );
    pager.ensure_rows(0..12).unwrap();
    assert_eq!(pager.cached_pages(), 3);

    // Anchor intersects page 1, whose previous_key is 0: reload key is 0 + 1.
    pager.set_anchor(5);
    assert_eq!(pager.refresh_key(), Some(1));
}

#[test]
fn refresh_key_none_for_lone_terminal_page_zero() {
    let mut pager = Pager::new(
        SliceSource::new(Vec::new(), 2),
        PagerOptions::new().with_page_size(4),
    );
    let p0 = complete(pager.load_page(0).unwrap());
    assert!(p0.is_terminal());
    assert_eq!(pager.state(0), PageState::Terminal);

    // Page 0 has neither a previous nor a next key to derive from.
    assert_eq!(pager.refresh_key(), None);

    // refresh() falls back to the default start page.
    let reloaded = complete(pager.refresh().unwrap());
    assert_eq!(reloaded.key, 0);
    assert!(reloaded.is_terminal());
}

#[test]
fn refresh_drops_window_and_reloads_around_anchor() {
    let mut pager = Pager::new(
        byte_source(24, 2),
        PagerOptions::new().with_page_size(4),
    );
    pager.ensure_rows(0..12).unwrap();
    pager.set_anchor(5);

    let reloaded = complete(pager.refresh().unwrap());
    assert_eq!(reloaded.key, 1);
    assert_eq!(pager.cached_pages(), 1);
    assert!(pager.page(1).is_some());
}

#[test]
fn failed_page_leaves_window_valid_and_is_retryable() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&attempts);
    let src = FnSource::new(move |index| {
        if index >= 4 && flag.fetch_add(1, Ordering::Relaxed) == 0 {
            return Err(io::Error::other("disk failure"));
        }
        Ok(vec![index as u8])
    });
    let mut pager = Pager::new(src, PagerOptions::new().with_page_size(4));

    pager.load_page(0).unwrap();
    let before: Vec<Vec<u8>> = pager.page(0).unwrap().rows.clone();

    let err = pager.load_page(1).unwrap_err();
    assert_eq!(err.row_index(), 4);
    assert_eq!(pager.state(1), PageState::Failed);
    // The failure is scoped to page 1; page 0 is untouched.
    assert_eq!(pager.page(0).unwrap().rows, before);

    // Failed is absorbing for range-driven loading...
    pager.ensure_rows(4..8).unwrap();
    assert_eq!(pager.state(1), PageState::Failed);

    // ...until the load is explicitly re-issued.
    let p1 = complete(pager.load_page(1).unwrap());
    assert_eq!(p1.len(), 4);
    assert_eq!(pager.state(1), PageState::Loaded);
}

#[test]
fn cancel_abandons_load_and_discards_partials() {
    let token = CancelToken::new();
    let mid_load = token.clone();
    let src = FnSource::new(move |index| {
        if index == 1 {
            mid_load.cancel();
        }
        Ok(vec![index as u8])
    });
    let load = load_page(&src, 0, 4, Some(&token)).unwrap();
    assert_eq!(load, PageLoad::Abandoned);
}

#[test]
fn pager_cancel_handle_abandons_then_rearms() {
    let mut pager = Pager::new(
        byte_source(16, 2),
        PagerOptions::new().with_page_size(4),
    );
    pager.cancel_handle().cancel();
    let load = pager.load_page(0).unwrap();
    assert_eq!(load, PageLoad::Abandoned);
    assert_eq!(pager.cached_pages(), 0);

    // The token re-arms after an abandoned load.
    let p0 = complete(pager.load_page(0).unwrap());
    assert_eq!(p0.len(), 4);
}

#[test]
fn parallel_load_matches_sequential_and_preserves_order() {
    let src = byte_source(64, 2); // 32 rows
    let seq = complete(load_page(&src, 1, 8, None).unwrap());
    let par = complete(load_page_parallel(&src, 1, 8, 4, None).unwrap());
    assert_eq!(seq, par);

    let expected: Vec<Vec<u8>> = (8..16).map(|i| vec![(2 * i) as u8, (2 * i + 1) as u8]).collect();
    assert_eq!(par.rows, expected);
}

#[test]
fn pager_with_parallelism_loads_identical_pages() {
    let mut seq = Pager::new(byte_source(64, 2), PagerOptions::new().with_page_size(8));
    let mut par = Pager::new(
        byte_source(64, 2),
        PagerOptions::new().with_page_size(8).with_parallelism(4),
    );
    let a = complete(seq.load_page(1).unwrap());
    let b = complete(par.load_page(1).unwrap());
    assert_eq!(a, b);
}

#[test]
fn parallel_load_fails_whole_page_on_row_error() {
    let src = FnSource::new(|index| {
        if index == 5 {
            return Err(io::Error::other("bad sector"));
        }
        Ok(vec![index as u8])
    });
    let err = load_page_parallel(&src, 0, 8, 4, None).unwrap_err();
    assert_eq!(err.row_index(), 5);
}

#[test]
fn ensure_rows_loads_only_uncached_pages() {
    let mut pager = Pager::new(
        CountingSource::new(byte_source(64, 2)),
        PagerOptions::new().with_page_size(4),
    );
    pager.ensure_rows(0..8).unwrap();
    assert_eq!(pager.source().fetches(), 8);

    pager.ensure_rows(0..8).unwrap();
    assert_eq!(pager.source().fetches(), 8);

    pager.ensure_rows(2..10).unwrap();
    assert_eq!(pager.source().fetches(), 12);
}

#[test]
fn ensure_rows_skips_keys_past_terminal() {
    let mut pager = Pager::new(
        CountingSource::new(byte_source(6, 2)), // 3 rows
        PagerOptions::new().with_page_size(4),
    );
    pager.ensure_rows(0..12).unwrap();

    // Page 0 is a partial tail, page 1 is terminal, page 2 is never fetched.
    assert_eq!(pager.source().fetches(), 8);
    assert_eq!(pager.terminal_key(), Some(1));
    assert_eq!(pager.state(0), PageState::Loaded);
    assert_eq!(pager.state(1), PageState::Terminal);
    assert_eq!(pager.state(2), PageState::Unloaded);
}

#[test]
fn pages_from_follows_next_key_until_terminal() {
    let mut pager = Pager::new(
        byte_source(20, 2), // 10 rows
        PagerOptions::new().with_page_size(4),
    );
    let pages: Vec<Page> = pager.pages_from(0).map(|p| p.unwrap()).collect();
    let keys: Vec<PageKey> = pages.iter().map(|p| p.key).collect();
    assert_eq!(keys, vec![0, 1, 2, 3]);
    assert_eq!(pages[2].len(), 2);
    assert!(pages[3].is_terminal());

    // Restartable: a fresh iterator from any key serves from the cache.
    let again: Vec<Page> = pager.pages_from(2).map(|p| p.unwrap()).collect();
    assert_eq!(again.len(), 2);
    assert_eq!(again[0].key, 2);
}

#[test]
fn page_events_report_loads_and_evictions() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut pager = Pager::new(
        byte_source(40, 2),
        PagerOptions::new()
            .with_page_size(2)
            .with_max_rows(4)
            .with_on_page_event(Some(move |e: &PageEvent| {
                sink.lock().unwrap().push(e.clone());
            })),
    );
    pager.load_page(0).unwrap();
    pager.load_page(1).unwrap();
    pager.load_page(2).unwrap();

    let seen = events.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            PageEvent::Loaded { key: 0, rows: 2, terminal: false },
            PageEvent::Loaded { key: 1, rows: 2, terminal: false },
            PageEvent::Loaded { key: 2, rows: 2, terminal: false },
            PageEvent::Evicted { key: 2 },
        ]
    );
}

#[test]
fn page_events_report_failures() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let src = FnSource::new(|_| Err::<Vec<u8>, _>(io::Error::other("nope")));
    let mut pager = Pager::new(
        src,
        PagerOptions::new()
            .with_page_size(2)
            .with_on_page_event(Some(move |e: &PageEvent| {
                sink.lock().unwrap().push(e.clone());
            })),
    );
    assert!(pager.load_page(3).is_err());
    assert_eq!(
        events.lock().unwrap().clone(),
        vec![PageEvent::Failed { key: 3 }]
    );
}

#[test]
fn row_accessor_returns_cached_rows() {
    let mut pager = Pager::new(
        byte_source(12, 2), // 6 rows
        PagerOptions::new().with_page_size(4),
    );
    pager.ensure_rows(0..6).unwrap();

    assert_eq!(pager.row(0), Some(&[0u8, 1][..]));
    assert_eq!(pager.row(5), Some(&[10u8, 11][..]));
    assert_eq!(pager.row(6), None); // past end of data
    assert_eq!(pager.row(40), None); // page never loaded
}

#[test]
fn slice_source_end_of_data_is_empty_not_error() {
    let src = byte_source(5, 2);
    assert_eq!(src.fetch_row(0).unwrap(), vec![0, 1]);
    assert_eq!(src.fetch_row(2).unwrap(), vec![4]); // partial tail row
    assert!(src.fetch_row(3).unwrap().is_empty());
    assert!(src.fetch_row(1000).unwrap().is_empty());
}

#[test]
fn file_source_reads_rows_and_signals_end() {
    let path = std::env::temp_dir().join(format!(
        "hexpager-filesource-{}.bin",
        std::process::id()
    ));
    std::fs::write(&path, [0u8, 1, 2, 3, 4, 5, 6]).unwrap();

    let src = FileSource::open(&path, 4).unwrap();
    assert_eq!(src.fetch_row(0).unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(src.fetch_row(1).unwrap(), vec![4, 5, 6]); // partial tail
    assert!(src.fetch_row(2).unwrap().is_empty());

    // Out-of-order fetches re-seek correctly.
    assert_eq!(src.fetch_row(0).unwrap(), vec![0, 1, 2, 3]);

    let _ = std::fs::remove_file(&path);
}
