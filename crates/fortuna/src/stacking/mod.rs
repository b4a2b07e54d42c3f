//! Temporal clustering of independently computed alignment events.

pub mod detector;
pub mod types;

pub use detector::StackDetector;
pub use types::{parse_timestamp, ExternalEvent, LinkTarget, StackEntry, StackLink, StackedGroup};
