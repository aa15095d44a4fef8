//! Persistent usage telemetry.
//!
//! One [`tracker::UsageTracker`] exists per process; every tool invocation
//! appends exactly one event, and the whole store is flushed to disk
//! (write-temp-then-rename) inside the same critical section that mutates
//! the in-memory state, so the two views never diverge.

pub mod tracker;

pub use tracker::{ToolSummary, TrackRequest, UsageEvent, UsageStore, UsageTracker};
