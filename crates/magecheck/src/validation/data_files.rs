//! Existence checks for the data files a submission references.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::model::{DataFileEntry, DataFileKind};

use super::finding::Finding;

/// Outcome of a data file check.
#[derive(Debug, Clone, Default)]
pub struct DataFileReport {
    pub findings: Vec<Finding>,
    /// Files that were looked up on disk.
    pub checked: Vec<String>,
    /// Raw files skipped because the submission is sequencing.
    pub skipped_raw: Vec<String>,
    /// Remote files (URIs) that cannot be checked locally.
    pub skipped_remote: Vec<String>,
}

/// Resolves data files against a data directory.
#[derive(Debug, Clone)]
pub struct DataFileChecker {
    data_dir: PathBuf,
    skip_raw: bool,
}

impl DataFileChecker {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            skip_raw: false,
        }
    }

    /// Skip raw files (sequencing submissions keep raw data elsewhere).
    pub fn with_skip_raw(mut self, skip: bool) -> Self {
        self.skip_raw = skip;
        self
    }

    /// Check every distinct file name once.
    pub fn check<'a>(&self, files: impl IntoIterator<Item = &'a DataFileEntry>) -> DataFileReport {
        let mut report = DataFileReport::default();
        let mut seen = IndexSet::new();

        for entry in files {
            if !seen.insert(entry.name.as_str()) {
                continue;
            }

            if entry.name.contains("://") {
                report.skipped_remote.push(entry.name.clone());
                continue;
            }

            if self.skip_raw && entry.kind == DataFileKind::Raw {
                report.skipped_raw.push(entry.name.clone());
                continue;
            }

            report.checked.push(entry.name.clone());
            if let Some(finding) = self.check_one(&entry.name) {
                report.findings.push(finding);
            }
        }

        report
    }

    fn check_one(&self, name: &str) -> Option<Finding> {
        let path = self.resolve(name);
        let file = name.to_string();

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(_) => return Some(Finding::MissingDataFile { file }),
        };

        if !metadata.is_file() {
            return Some(Finding::UnreadableDataFile {
                file,
                reason: "not a regular file".to_string(),
            });
        }

        if metadata.len() == 0 {
            return Some(Finding::EmptyDataFile { file });
        }

        match File::open(&path) {
            Ok(_) => None,
            Err(e) => Some(Finding::UnreadableDataFile {
                file,
                reason: e.to_string(),
            }),
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}
