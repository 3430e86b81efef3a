//! Adapter utilities for the `hexpager` crate.
//!
//! The `hexpager` crate is UI-agnostic and focuses on paging state. This
//! crate provides small, framework-neutral helpers commonly needed by
//! presentation layers:
//!
//! - Row formatting: aligned hex/ASCII cell columns and offset headers
//! - A controller wrapping the pager with viewport and refresh workflows
//! - A channel bridge for consuming page events by polling
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![forbid(unsafe_code)]

mod channel;
mod controller;
mod format;


pub use channel::page_event_channel;
pub use controller::Controller;
pub use format::{RowCells, format_row, header_cells, is_printable};
