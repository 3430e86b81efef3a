// Example: render a buffer as an aligned hex/ASCII dump.
use hexpager::{Pager, PagerOptions, SliceSource};
use hexpager_adapter::{format_row, header_cells};

const ROW_LEN: usize = 16;
const PAGE_SIZE: usize = 8;

fn main() {
    let bytes: Vec<u8> = (0..200u32).map(|i| (i * 7 % 256) as u8).collect();
    let mut pager = Pager::new(
        SliceSource::new(bytes, ROW_LEN),
        PagerOptions::new().with_page_size(PAGE_SIZE),
    );

    println!("      {}", header_cells(ROW_LEN).join(" "));
    for page in pager.pages_from(0) {
        let page = page.expect("page load failed");
        for (i, row) in page.rows.iter().enumerate() {
            let index = page.first_row(PAGE_SIZE) + i;
            let cells = format_row(row, ROW_LEN);
            println!(
                "{:04X}  {}  {}",
                index * ROW_LEN,
                cells.hex_line(),
                cells.ascii_line()
            );
        }
    }
}
