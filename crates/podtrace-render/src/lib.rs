//! Timeline rendering for podtrace
//!
//! This crate turns time-ordered kubelet events into the tabular, optionally
//! colored timeline written to stdout.

mod duration;
mod theme;
mod timeline;

pub use theme::Theme;
pub use timeline::{DEFAULT_MESSAGE_WIDTH, TimelineRenderer};
