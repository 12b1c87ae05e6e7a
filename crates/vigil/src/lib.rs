//! Vigil - HTTP endpoint status tracking and change detection.
//!
//! A check run probes every enabled target, diffs the fresh results
//! against the persisted status store, appends detected transitions to
//! the change log, and persists both files. A separate notifier consumes
//! recorded transitions and forwards them to a webhook endpoint.
//!
//! The two persisted files are read once at process start and written
//! once at process end. There is no cross-process locking; overlapping
//! invocations are unsupported and callers must serialize runs (e.g. via
//! their scheduler).

pub mod config;
pub mod engine;
pub mod notify;
pub mod probe;
pub mod store;
pub mod types;

// Re-export main types
pub use config::{Config, Target};
pub use engine::{CheckerEngine, RunOutcome};
pub use probe::{HttpProber, Prober};
pub use store::{ChangeLog, StatusStore};
pub use types::{ChangeRecord, ProbeResult, RunSummary, Status};
