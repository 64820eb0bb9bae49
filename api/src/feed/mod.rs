//! Feed module
//!
//! Syndication writers: RSS 2.0 documents and OPML subscription lists.

pub mod renderer;

pub use renderer::{render_opml, render_rss};
