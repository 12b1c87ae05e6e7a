use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::probe::Prober;
use crate::store::StatusStore;
use crate::types::{ChangeRecord, RunSummary, Status};

/// Everything one check cycle produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Prior store with every checked target's entry replaced.
    pub store: StatusStore,
    /// Detected transitions, in configuration order.
    pub changes: Vec<ChangeRecord>,
    pub summary: RunSummary,
}

/// Runs one probe-diff-merge cycle over the configured targets.
///
/// Targets are probed sequentially in configuration order. Each fresh
/// result replaces the target's store entry outright; comparing it
/// against the *prior* entry (absent means UNKNOWN) decides whether a
/// change record is emitted. Disabled targets are skipped entirely and
/// keep whatever entry they already had.
///
/// Given deterministic prober outputs and target order, the whole cycle
/// is a deterministic fold; a probe failure surfaces as a DOWN result and
/// never aborts the run.
pub struct CheckerEngine {
    prober: Box<dyn Prober>,
}

impl CheckerEngine {
    pub fn new(prober: Box<dyn Prober>) -> Self {
        Self { prober }
    }

    pub async fn run_once(&self, config: &Config, prior: &StatusStore) -> RunOutcome {
        let mut store = prior.clone();
        let mut changes = Vec::new();
        let mut summary = RunSummary::default();

        for target in config.servers.iter().filter(|target| target.enabled) {
            info!("checking {} ({})", target.name, target.url);

            let timeout = Duration::from_secs(target.timeout_or(&config.settings));
            let result = self.prober.probe(target, timeout).await;

            summary.total += 1;
            match result.status {
                Status::Up => summary.up += 1,
                _ => summary.down += 1,
            }

            let previous =
                prior.get(&target.id).map_or(Status::Unknown, |entry| entry.status);
            if previous != result.status {
                info!("status change: {} {previous} -> {}", target.name, result.status);
                changes.push(ChangeRecord {
                    target_id: target.id.clone(),
                    target_name: target.name.clone(),
                    previous_status: previous,
                    current_status: result.status,
                    changed_at: result.checked_at,
                    response_time_ms: result.response_time_ms,
                    error_message: result.error_message.clone(),
                });
            }

            store.insert(result);
        }

        summary.changes = changes.len();
        RunOutcome { store, changes, summary }
    }
}
