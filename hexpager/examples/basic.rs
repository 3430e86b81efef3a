// Example: minimal usage — page a byte buffer and inspect the window.
use hexpager::{Pager, PagerOptions, SliceSource};

fn main() {
    let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let source = SliceSource::new(bytes, 16);

    let mut pager = Pager::new(
        source,
        PagerOptions::new().with_page_size(32).with_max_rows(64),
    );

    pager.set_anchor(40);
    pager.ensure_rows(32..96).expect("page load failed");

    println!("cached_pages={}", pager.cached_pages());
    println!("cached_rows={}", pager.cached_rows());
    for page in pager.pages() {
        println!(
            "page key={} rows={} prev={:?} next={:?}",
            page.key,
            page.len(),
            page.previous_key,
            page.next_key
        );
    }
    println!("row 40 = {:?}", pager.row(40));
    println!("refresh_key={:?}", pager.refresh_key());
}
