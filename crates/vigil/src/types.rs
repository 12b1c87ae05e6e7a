use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observed status of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
    /// Sentinel for a target with no prior entry. Never a probe outcome.
    Unknown,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Up => write!(f, "UP"),
            Status::Down => write!(f, "DOWN"),
            Status::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Outcome of checking one target. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub target_id: String,

    /// Always `Up` or `Down` for a performed check.
    pub status: Status,

    /// Present whenever a response was received, even on a status-code
    /// mismatch. Absent when no response arrived at all.
    pub response_time_ms: Option<f64>,

    /// Diagnostic for timeouts, connection failures, and unexpected
    /// status codes.
    pub error_message: Option<String>,

    pub checked_at: DateTime<Utc>,
}

impl ProbeResult {
    /// Successful check with the observed response time.
    pub fn up(target_id: impl Into<String>, response_time_ms: f64) -> Self {
        Self {
            target_id: target_id.into(),
            status: Status::Up,
            response_time_ms: Some(response_time_ms),
            error_message: None,
            checked_at: Utc::now(),
        }
    }

    /// Failed check. `response_time_ms` is set when a response was
    /// received but did not match expectations.
    pub fn down(
        target_id: impl Into<String>,
        response_time_ms: Option<f64>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            status: Status::Down,
            response_time_ms,
            error_message: Some(error.into()),
            checked_at: Utc::now(),
        }
    }
}

/// A status transition between two consecutive runs for one target.
///
/// Created only when the fresh status differs from the stored one;
/// `changed_at` is the `checked_at` of the triggering result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub target_id: String,
    pub target_name: String,
    pub previous_status: Status,
    pub current_status: Status,
    pub changed_at: DateTime<Utc>,
    pub response_time_ms: Option<f64>,
    pub error_message: Option<String>,
}

/// Counters reported at the end of a check run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    pub changes: usize,
}
