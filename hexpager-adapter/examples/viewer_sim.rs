// Example: simulate a scrolling viewport over a paged byte stream.
//
// The adapter flow is typically:
// 1) subscribe to page events (or poll the pager directly)
// 2) call on_viewport whenever the visible row range changes
// 3) render the returned row slots, placeholders included
// 4) call refresh after the underlying data may have changed
use hexpager::{PagerOptions, SliceSource};
use hexpager_adapter::{Controller, format_row};

fn main() {
    let source = SliceSource::new((0..240u8).collect::<Vec<_>>(), 8);
    let mut c = Controller::new(
        source,
        PagerOptions::new().with_page_size(10).with_max_rows(20),
    );
    let events = c.subscribe();

    // Scroll down in steps of five rows, ten rows visible at a time.
    for first_row in (0..30).step_by(5) {
        c.on_viewport(first_row, 10).expect("page load failed");
    }

    for slot in c.rows(25..35) {
        match slot {
            Some(row) => println!("{}", format_row(row, 8).hex_line()),
            None => println!("(placeholder)"),
        }
    }

    while let Ok(event) = events.try_recv() {
        println!("event: {event:?}");
    }

    let reloaded = c.refresh().expect("refresh failed");
    println!(
        "refreshed from key {:?}",
        reloaded.map(|p| p.key)
    );
}
