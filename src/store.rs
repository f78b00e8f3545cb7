//! Durable CSV record store: append-only, header written once per file.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::record::{BidRecord, CSV_HEADER};

pub struct BidStore {
    path: PathBuf,
}

impl BidStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All bid numbers already persisted. A missing file is an empty store.
    /// Malformed rows are skipped rather than failing the whole load.
    pub fn load_seen_ids(&self) -> Result<HashSet<String>> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("failed to open store {}", self.path.display()))?;

        let mut seen = HashSet::new();
        for result in rdr.records() {
            let record = match result {
                Ok(r) => r,
                Err(_) => continue,
            };
            if let Some(id) = record.get(0) {
                let id = id.trim();
                if !id.is_empty() {
                    seen.insert(id.to_string());
                }
            }
        }
        Ok(seen)
    }

    /// Append rows without rewriting prior ones. The header row is emitted
    /// only when the file was empty before this write, so a run resuming an
    /// existing store never duplicates it.
    pub fn append(&self, rows: &[BidRecord]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let existing_size = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open store {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if existing_size == 0 {
            writer.write_record(CSV_HEADER)?;
        }
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(rows.len())
    }
}
