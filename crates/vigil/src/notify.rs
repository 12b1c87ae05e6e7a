use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::types::{ChangeRecord, Status};

/// Fixed per-request delivery timeout.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// A failure to read the notification input. Fatal to the batch.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("{path} is not a JSON array of change records: {source}")]
    Parse { path: String, source: serde_json::Error },
}

/// A failure to deliver one message. Logged per record, never fatal.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {source}")]
    Send { source: reqwest::Error },
    #[error("webhook returned status {status}")]
    Rejected { status: u16 },
}

/// Read a notification input file: a JSON array of change records.
pub fn load_changes(path: &Path) -> Result<Vec<ChangeRecord>, InputError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| InputError::Read { path: path.display().to_string(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| InputError::Parse { path: path.display().to_string(), source })
}

/// Human-readable transition text with an urgency marker.
pub fn build_message(change: &ChangeRecord) -> String {
    let marker = if change.current_status == Status::Down {
        ":red_circle:"
    } else {
        ":large_green_circle:"
    };

    let mut message = format!(
        "{marker} *{}* status change: {} -> {}\ntime: `{}`",
        change.target_name,
        change.previous_status,
        change.current_status,
        change.changed_at.to_rfc3339(),
    );
    if let Some(response_time) = change.response_time_ms {
        message.push_str(&format!("\nresponse time: `{response_time}ms`"));
    }
    if let Some(error) = &change.error_message {
        message.push_str(&format!("\nerror: `{error}`"));
    }
    message
}

/// Delivers change notifications to a webhook endpoint, one POST per
/// record.
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(DELIVERY_TIMEOUT).build()?;
        Ok(Self { client, webhook_url: webhook_url.into() })
    }

    /// Send one message per record. A failed delivery is logged and the
    /// batch continues; returns the number of failures.
    pub async fn deliver_all(&self, changes: &[ChangeRecord]) -> usize {
        let mut failures = 0;
        for change in changes {
            match self.deliver(change).await {
                Ok(()) => info!(
                    "notified: {} {} -> {}",
                    change.target_name, change.previous_status, change.current_status
                ),
                Err(err) => {
                    failures += 1;
                    error!("notification for {} failed: {err}", change.target_name);
                }
            }
        }
        failures
    }

    async fn deliver(&self, change: &ChangeRecord) -> Result<(), DeliveryError> {
        let payload = json!({ "text": build_message(change) });
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| DeliveryError::Send { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected { status: status.as_u16() });
        }
        Ok(())
    }
}
