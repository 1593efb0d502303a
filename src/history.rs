// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Journal of finished sort runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::pipeline::{Placement, SortRequest, SortSummary};
use crate::Result;

/// One completed or cancelled run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub request: SortRequest,
    pub output_root: PathBuf,
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub placements: Vec<Placement>,
}

/// Append-only JSONL file of run records
pub struct History {
    path: PathBuf,
}

impl History {
    /// Create a new history manager
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append a record to the journal
    pub fn append(&self, record: &RunRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(record)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read all records, oldest first
    pub fn read_all(&self) -> Result<Vec<RunRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to parse history entry: {}", e);
                }
            }
        }

        Ok(records)
    }

    /// Get the most recent N records (newest first)
    pub fn get_recent(&self, count: usize) -> Result<Vec<RunRecord>> {
        let mut records = self.read_all()?;
        records.reverse();
        records.truncate(count);
        Ok(records)
    }

    /// Clear all history
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Get history file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Build the record for a finished run
pub fn create_record(request: &SortRequest, output_root: &Path, summary: &SortSummary) -> RunRecord {
    RunRecord {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        request: *request,
        output_root: output_root.to_path_buf(),
        total: summary.total,
        processed: summary.processed,
        skipped: summary.skipped,
        failed: summary.failed,
        cancelled: summary.cancelled,
        placements: summary.placements.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Bucket, FeatureThresholds};

    fn summary(processed: usize) -> SortSummary {
        SortSummary {
            total: processed,
            processed,
            placements: (0..processed)
                .map(|i| Placement {
                    source: PathBuf::from(format!("in/{}.png", i)),
                    destination: PathBuf::from(format!("out/{}.png", i)),
                    bucket: Bucket::LowHigh,
                })
                .collect(),
            ..SortSummary::default()
        }
    }

    fn request() -> SortRequest {
        SortRequest::Feature(FeatureThresholds::new(1.0, 2.0).unwrap())
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let history = History::new(dir.path().join("h.jsonl"));

        history.append(&create_record(&request(), Path::new("out"), &summary(2))).unwrap();
        let records = history.read_all().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].processed, 2);
        assert_eq!(records[0].placements[1].bucket, Bucket::LowHigh);
        assert_eq!(records[0].request, request());
    }

    #[test]
    fn test_recent_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let history = History::new(dir.path().join("h.jsonl"));
        for n in 1..=3 {
            history.append(&create_record(&request(), Path::new("out"), &summary(n))).unwrap();
        }

        let recent = history.get_recent(2).unwrap();
        assert_eq!(recent.iter().map(|r| r.processed).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        let history = History::new(path.clone());
        history.append(&create_record(&request(), Path::new("out"), &summary(1))).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{ truncated").unwrap();

        assert_eq!(history.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let history = History::new(dir.path().join("h.jsonl"));
        history.append(&create_record(&request(), Path::new("out"), &summary(0))).unwrap();

        history.clear().unwrap();
        assert!(!history.path().exists());
        assert!(history.read_all().unwrap().is_empty());
    }
}
