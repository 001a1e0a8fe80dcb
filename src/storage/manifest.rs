//! The URL manifest written by enumeration and read by the fetch phase

use crate::model::UrlRecord;
use crate::storage::{write_json_atomic, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Time of the last save
    pub timestamp: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestStatistics {
    /// Share of resolved records, e.g. `"87.5%"`
    pub success_rate: String,
}

/// Persisted list of resolved URL records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub metadata: ManifestMetadata,
    pub statistics: ManifestStatistics,
    pub urls: Vec<UrlRecord>,
}

impl Manifest {
    /// An empty manifest started at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::from_records(Vec::new(), now)
    }

    pub fn from_records(urls: Vec<UrlRecord>, now: DateTime<Utc>) -> Self {
        let mut manifest = Self {
            metadata: ManifestMetadata {
                timestamp: now,
                started_at: now,
                total_count: 0,
                success_count: 0,
                failed_count: 0,
                is_complete: false,
            },
            statistics: ManifestStatistics {
                success_rate: format_rate(0, 0),
            },
            urls,
        };
        manifest.refresh_counts();
        manifest
    }

    /// Loads a manifest; `Ok(None)` if the file does not exist
    pub fn load(path: &Path) -> StorageResult<Option<Self>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut manifest: Manifest = serde_json::from_str(&text)?;
        manifest.refresh_counts();
        Ok(Some(manifest))
    }

    /// Refreshes counts and writes the manifest atomically
    pub fn save(&mut self, path: &Path, now: DateTime<Utc>, complete: bool) -> StorageResult<()> {
        self.metadata.timestamp = now;
        self.metadata.is_complete = complete;
        self.refresh_counts();
        write_json_atomic(path, self)?;
        tracing::debug!(
            "Manifest saved to {} ({} urls)",
            path.display(),
            self.urls.len()
        );
        Ok(())
    }

    pub fn push(&mut self, record: UrlRecord) {
        self.urls.push(record);
        self.refresh_counts();
    }

    /// Highest listing page present in the manifest
    pub fn last_page(&self) -> Option<u32> {
        self.urls.iter().map(|r| r.page).max()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    fn refresh_counts(&mut self) {
        let total = self.urls.len();
        // A record that kept its initial URL is still fetchable
        let success = self
            .urls
            .iter()
            .filter(|r| r.usable_url().is_some())
            .count();
        self.metadata.total_count = total;
        self.metadata.success_count = success;
        self.metadata.failed_count = total - success;
        self.statistics.success_rate = format_rate(success, total);
    }
}

/// Formats a share as a percentage string with one decimal
pub fn format_rate(part: usize, total: usize) -> String {
    if total == 0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / total as f64)
    }
}
