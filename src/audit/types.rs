use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Documentation state of one file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocStatus {
    Success,
    Outdated,
    NoHeader,
    Unknown,
    DirtyCode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub status: DocStatus,
    pub reason: String,
}

impl AuditResult {
    pub fn new(status: DocStatus, reason: impl Into<String>) -> Self {
        AuditResult {
            status,
            reason: reason.into(),
        }
    }

    /// Whether the file shows up as a documentation finding.
    pub fn needs_attention(&self) -> bool {
        matches!(self.status, DocStatus::Outdated | DocStatus::NoHeader)
    }
}

/// A cached audit, valid while the file's last commit is `last_seen_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub file_path: String,
    pub last_seen_hash: String,
    pub result: AuditResult,
}

/// Audit results keyed by file path.
///
/// A lookup only hits when the caller's current hash equals the recorded one;
/// a mismatch behaves like a miss and the next [`AuditCache::store`] replaces it.
#[derive(Debug, Default)]
pub struct AuditCache {
    records: Mutex<HashMap<String, CacheRecord>>,
}

impl AuditCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from records persisted by the host.
    pub fn from_records(records: impl IntoIterator<Item = CacheRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.file_path.clone(), r)).collect();
        AuditCache {
            records: Mutex::new(map),
        }
    }

    pub fn lookup(&self, file_path: &str, current_hash: &str) -> Option<AuditResult> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .get(file_path)
            .filter(|r| r.last_seen_hash == current_hash)
            .map(|r| r.result.clone())
    }

    pub fn store(&self, file_path: &str, hash: &str, result: AuditResult) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(
            file_path.to_string(),
            CacheRecord {
                file_path: file_path.to_string(),
                last_seen_hash: hash.to_string(),
                result,
            },
        );
    }

    pub fn invalidate(&self, file_path: &str) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.remove(file_path);
    }

    /// Snapshot for persistence, sorted by path.
    pub fn records(&self) -> Vec<CacheRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<CacheRecord> = records.values().cloned().collect();
        out.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        out
    }
}

/// A file missing markers or documentation for some commit dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MissingDates {
    pub file_path: String,
    pub dates: Vec<String>,
    pub reason: String,
}
