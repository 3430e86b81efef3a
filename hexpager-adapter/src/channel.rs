use std::sync::Arc;

use crossbeam_channel::{Receiver, unbounded};
use hexpager::{PageEvent, PageEventCallback};

/// Builds a page-event callback wired to an unbounded channel.
///
/// Install the callback via `PagerOptions::with_on_page_event` (or
/// [`crate::Controller::subscribe`]) and poll the receiver at your own pace.
/// Events sent after every receiver is dropped are discarded.
pub fn page_event_channel() -> (PageEventCallback, Receiver<PageEvent>) {
    let (tx, rx) = unbounded();
    let callback: PageEventCallback = Arc::new(move |event: &PageEvent| {
        let _ = tx.send(event.clone());
    });
    (callback, rx)
}
