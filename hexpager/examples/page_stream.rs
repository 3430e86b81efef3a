// Example: pull pages as a lazy sequence until the terminal page.
use hexpager::{Pager, PagerOptions, SliceSource};

fn main() {
    let source = SliceSource::new((0..100u8).collect::<Vec<_>>(), 8);
    let mut pager = Pager::new(source, PagerOptions::new().with_page_size(4));

    for page in pager.pages_from(0) {
        match page {
            Ok(page) => {
                println!(
                    "page key={} rows={}{}",
                    page.key,
                    page.len(),
                    if page.is_terminal() { " (terminal)" } else { "" }
                );
            }
            Err(err) => {
                eprintln!("load failed: {err}");
                break;
            }
        }
    }

    // The sequence is restartable: loads from any key stay possible.
    let restarted = pager.pages_from(2).count();
    println!("pages from key 2: {restarted}");
}
