//! Log processing for podtrace
//!
//! This crate extracts kubelet events from raw log lines, decides which of
//! them belong to the target pod, and classifies them by subsystem.

mod buffer;
mod classifier;
mod error;
mod filter;
mod parser;
mod stream;

pub use buffer::{EventBuffer, SubsystemCounts};
pub use classifier::{classify, classify_event};
pub use error::PipelineError;
pub use filter::{FilterDecision, GRACEFUL_DELETION_MSG, PLEG_RELIST_MSG, RelevanceFilter};
pub use parser::LogParser;
pub use stream::{LogStream, StreamStats};

// Re-export types used in our public API
pub use podtrace_types::{KubeletEvent, PodRef, Subsystem};
