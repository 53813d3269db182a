//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address, without the `/api` suffix
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retries per queued report during a replay
    pub max_retries: usize,

    /// Delay before the first retry; doubles after each one
    pub initial_backoff: Duration,

    /// Where the offline queue is persisted. `None` keeps it in memory.
    pub queue_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            queue_path: None,
        }
    }
}

impl ClientConfig {
    /// Configuration for a server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Persist the offline queue at `path`
    pub fn with_queue_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.queue_path = Some(path.into());
        self
    }

    /// Short timeouts and backoff for tests
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(5),
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            queue_path: None,
        }
    }
}
