use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::model::config::SeedConfig;
use crate::model::task::{Source, Task};

/// A placeholder item from the seed endpoint. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Error type for the seed fetch
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("could not decode sample tasks: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fetch one batch of sample items. No retries.
pub fn fetch(config: &SeedConfig) -> Result<Vec<RemoteItem>, SeedError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    let resp = client
        .get(&config.url)
        .query(&[("_limit", config.limit.to_string())])
        .send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SeedError::Status(status));
    }
    let body = resp.text()?;
    let mut items = decode_items(&body)?;
    items.truncate(config.limit);
    Ok(items)
}

pub fn decode_items(body: &str) -> Result<Vec<RemoteItem>, serde_json::Error> {
    serde_json::from_str(body)
}

/// Map remote items into API-sourced tasks, keeping the remote IDs.
/// Items with a blank title are skipped.
pub fn to_tasks(items: Vec<RemoteItem>) -> Vec<Task> {
    items
        .into_iter()
        .filter(|item| !item.title.trim().is_empty())
        .map(|item| {
            let mut task = Task::new(item.id, item.title.trim());
            task.completed = item.completed;
            task.source = Source::Api;
            task
        })
        .collect()
}

/// Fetch and map in one step
pub fn load_seed(config: &SeedConfig) -> Result<Vec<Task>, SeedError> {
    info!(url = %config.url, limit = config.limit, "fetching sample tasks");
    match fetch(config) {
        Ok(items) => {
            let tasks = to_tasks(items);
            info!(count = tasks.len(), "fetched sample tasks");
            Ok(tasks)
        }
        Err(e) => {
            warn!(error = %e, "sample task fetch failed");
            Err(e)
        }
    }
}

/// Run `load_seed` on a background thread. The result arrives once on the
/// returned channel; the event loop polls it with `try_recv`.
pub fn spawn_seed(config: SeedConfig) -> Receiver<Result<Vec<Task>, SeedError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // Receiver may be gone if the UI already quit
        let _ = tx.send(load_seed(&config));
    });
    rx
}
