//! Token usage log. Every generation call is reported through `tracing`;
//! when a directory is configured the record is also appended as one JSON
//! line to `token_usage.jsonl` inside it.
//!
//! Logging is best-effort: a failed write is a warning, never a request error.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use super::TokenUsage;

const USAGE_LOG_FILE: &str = "token_usage.jsonl";

#[derive(Debug, Serialize)]
pub struct UsageLogEntry<'a> {
    pub call_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub model: &'a str,
    #[serde(flatten)]
    pub usage: &'a TokenUsage,
}

#[derive(Debug, Clone, Default)]
pub struct UsageLog {
    dir: Option<PathBuf>,
}

impl UsageLog {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// A log that only emits tracing events.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(USAGE_LOG_FILE))
    }

    pub async fn record(&self, model: &str, usage: &TokenUsage) {
        let entry = UsageLogEntry {
            call_id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            model,
            usage,
        };

        info!(
            call_id = %entry.call_id,
            extractor = usage.extractor.as_deref().unwrap_or("-"),
            model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            is_estimated = usage.is_estimated,
            source = ?usage.source,
            "token usage"
        );

        if let Some(dir) = &self.dir {
            if let Err(e) = append_entry(dir, &entry).await {
                warn!("Failed to write token usage log in {}: {e}", dir.display());
            }
        }
    }
}

async fn append_entry(dir: &Path, entry: &UsageLogEntry<'_>) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    let mut line = serde_json::to_vec(entry)?;
    line.push(b'\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(USAGE_LOG_FILE))
        .await?;
    file.write_all(&line).await?;
    file.flush().await?;
    Ok(())
}
