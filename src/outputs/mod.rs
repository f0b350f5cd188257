//! Output generation for extraction results.
//!
//! # Submodules
//!
//! - [`json`]: Serializes an [`ExtractionOutcome`](crate::models::ExtractionOutcome)
//!   to JSON, on stdout or to a file
//! - [`report`]: Renders a human-readable summary for the terminal
//! - [`debug`]: Persists the raw acquired HTML for post-hoc inspection
//!
//! # Debug Dump Layout
//!
//! ```text
//! debug_dir/
//! └── www_thebaltimorebanner_com_news_story-ABC123.html
//! ```

pub mod debug;
pub mod json;
pub mod report;
