//! A headless paging engine for hex viewers.
//!
//! For presentation-adjacent utilities (row formatting, controllers), see the
//! `hexpager-adapter` crate.
//!
//! This crate focuses on the core state needed to drive a paged view over a
//! lazily fetched byte stream: fixed-size pages addressed by key, a bounded
//! window of cached pages with anchor-directed eviction, and an anchor-derived
//! refresh key for restoring position after the window is lost.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - a [`RowSource`] producing the bytes for each row index
//! - the viewport position (anchor row and visible row range)
//! - a render loop consuming cached rows, page events, or the pull-based
//!   [`Pager::pages_from`] iterator
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod error;
mod loader;
mod options;
mod pager;
mod source;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use error::LoadError;
pub use loader::{CancelToken, PageLoad, load_page, load_page_parallel};
pub use options::{PageEventCallback, PagerOptions};
pub use pager::{PageIter, Pager};
pub use source::{FileSource, FnSource, RowSource, SliceSource};
pub use types::{Page, PageEvent, PageKey, PageState};
