use anyhow::{Context, Result};
use glob::glob;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::models::{LogRecord, RateTable, UsageEvent};

/// Reads usage events out of the JSONL transcripts under a projects root.
pub struct DataLoader {
    projects_dir: PathBuf,
    rates: RateTable,
}

impl DataLoader {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
            rates: RateTable::default(),
        }
    }

    /// Every event in every transcript, files in ascending modification
    /// time and lines in file order. A bad file or line is skipped.
    pub fn load_events(&self) -> Result<Vec<UsageEvent>> {
        if !self.projects_dir.is_dir() {
            anyhow::bail!("Projects directory not found: {:?}", self.projects_dir);
        }

        let mut events = Vec::new();
        for path in self.find_log_files()? {
            debug!("Loading file: {:?}", path);
            match self.load_jsonl_file(&path) {
                Ok(file_events) => events.extend(file_events),
                Err(e) => warn!("Skipping {:?}: {:#}", path, e),
            }
        }

        Ok(events)
    }

    fn find_log_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.projects_dir.join("**/*.jsonl");
        let pattern_str = pattern.to_str().context("Invalid path")?;

        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in glob(pattern_str)? {
            match entry {
                Ok(path) => {
                    let modified = path
                        .metadata()
                        .and_then(|m| m.modified())
                        .unwrap_or(SystemTime::UNIX_EPOCH);
                    files.push((modified, path));
                }
                Err(e) => warn!("Error reading path: {}", e),
            }
        }

        // Stable sort keeps glob order for files sharing an mtime
        files.sort_by_key(|(modified, _)| *modified);
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }

    fn load_jsonl_file(&self, path: &Path) -> Result<Vec<UsageEvent>> {
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let json_str = match line {
                Ok(l) => l,
                Err(e) => {
                    debug!("Error reading line {} in {:?}: {}", line_num + 1, path, e);
                    continue;
                }
            };

            let trimmed = json_str.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: LogRecord = match serde_json::from_str(trimmed) {
                Ok(record) => record,
                Err(e) => {
                    debug!("Failed to parse line {} in {:?}: {}", line_num + 1, path, e);
                    continue;
                }
            };

            if let Some(event) = UsageEvent::from_record(&record, &self.rates) {
                events.push(event);
            }
        }

        Ok(events)
    }
}
