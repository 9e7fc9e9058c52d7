use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::config::model::NotifyConfig;
use crate::error::{BackuperError, Result};
use crate::types::RunMode;

pub const BACKUP_FAILED: &str = "Backup failed!";
pub const BACKUP_SUCCESSFUL: &str = "Backup successful!";
pub const OFFSITE_BACKUP: &str = "Offsite backup";
pub const SERVICE_CRASHED: &str = "Backup service crashed!";
pub const DEVICE_WARNING: &str = "Backup disk warning";
pub const SNAPSHOT_FAILED: &str = "Snapshot failed!";

/// Fire-and-forget delivery of operator-facing events.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Publishes to an ntfy topic; the title and tags travel as headers.
pub struct NtfyNotifier {
    client: Client,
    url: Option<String>,
    tags: String,
    run_mode: RunMode,
}

impl NtfyNotifier {
    pub fn new(cfg: &NotifyConfig, run_mode: RunMode) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BackuperError::message(format!("build http client: {}", e)))?;
        Ok(Self {
            client,
            url: cfg.url.clone(),
            tags: cfg.tags.clone(),
            run_mode,
        })
    }
}

impl Notifier for NtfyNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!("{} | {}", title, message);
        let Some(url) = &self.url else {
            return;
        };
        if self.run_mode.dry_run {
            info!("dry-run: skip notification to {}", url);
            return;
        }
        let response = self
            .client
            .post(url)
            .header("Title", title)
            .header("Tags", self.tags.as_str())
            .body(message.to_string())
            .send();
        match response {
            Ok(resp) if !resp.status().is_success() => {
                warn!("notification to {} returned {}", url, resp.status());
            }
            Ok(_) => {}
            Err(err) => warn!("notification to {} failed: {}", url, err),
        }
    }
}
