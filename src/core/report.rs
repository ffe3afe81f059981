use crate::domain::model::{QualityTier, RemovalStatus};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 單張圖片的處理紀錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub input: String,
    pub status: RemovalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl ReportEntry {
    pub fn succeeded(input: &str, output_path: &str, duration: Duration) -> Self {
        Self {
            input: input.to_string(),
            status: RemovalStatus::Succeeded,
            output_path: Some(output_path.to_string()),
            error: None,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn failed(input: &str, status: RemovalStatus, error: String, duration: Duration) -> Self {
        Self {
            input: input.to_string(),
            status,
            output_path: None,
            error: Some(error),
            duration_ms: duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub model: String,
    pub quality: QualityTier,
    pub entries: Vec<ReportEntry>,
}

impl BatchReport {
    pub fn start(model: &str, quality: QualityTier) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            model: model.to_string(),
            quality,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(RemovalStatus::Succeeded)
    }

    pub fn blocked(&self) -> usize {
        self.count(RemovalStatus::Blocked)
    }

    pub fn failed(&self) -> usize {
        self.count(RemovalStatus::Failed)
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.total()
    }

    fn count(&self, status: RemovalStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub async fn save<S: Storage>(&self, storage: &S, path: &str) -> Result<()> {
        let json = self.to_json()?;
        storage.write_file(path, json.as_bytes()).await?;
        tracing::debug!("💾 Report written to {}", path);
        Ok(())
    }
}
