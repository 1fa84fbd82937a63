//! Page layout for the PDF emitter: font metrics, per-template geometry, and
//! the flow engine that positions blocks on pages.
//!
//! Layout is CPU-bound; callers run it inside `tokio::task::spawn_blocking`.

pub mod flow;
pub mod font_metrics;
pub mod page;

pub use flow::{lay_out, Placed};
pub use page::page_layout;
