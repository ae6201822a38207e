//! Validator configuration.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::checks::CheckModuleRegistry;
use crate::error::{MagetabError, Result};
use crate::status::{SharedReportSink, CORE_CHANNEL};

/// A check module to run, with an optional log file prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckModuleSpec {
    pub name: String,
    pub log_prefix: Option<String>,
}

impl CheckModuleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log_prefix: None,
        }
    }

    pub fn with_log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_prefix = Some(prefix.into());
        self
    }
}

impl std::str::FromStr for CheckModuleSpec {
    type Err = String;

    /// Parse `NAME` or `NAME=PREFIX`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, prefix) = match s.split_once('=') {
            Some((name, prefix)) => (name.trim(), Some(prefix.trim())),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(format!("Missing check module name in '{}'", s));
        }

        let spec = CheckModuleSpec::new(name);
        Ok(match prefix {
            Some(p) if !p.is_empty() => spec.with_log_prefix(p),
            _ => spec,
        })
    }
}

/// Configuration for one validation run.
#[derive(Clone, Default)]
pub struct ValidatorConfig {
    /// IDF file. Exclusive with `combined`.
    pub idf: Option<PathBuf>,
    /// Combined IDF+SDRF document. Exclusive with `idf`.
    pub combined: Option<PathBuf>,
    /// Directory holding sample sheets and data files (default: the input's directory).
    pub data_dir: Option<PathBuf>,
    /// Accession injected as the `ArrayExpressAccession` comment.
    pub accession: Option<String>,
    /// Log file prefix for the core channel.
    pub log_prefix: Option<String>,
    pub check_modules: Vec<CheckModuleSpec>,
    /// Skip data matrix parsing and data file checks.
    pub skip_data_checks: bool,
    /// Lower channel thresholds to debug.
    pub verbose: bool,
    pub report_sink: Option<SharedReportSink>,
    /// Report sink for the atlas module, if it should differ from `report_sink`.
    pub atlas_report_sink: Option<SharedReportSink>,
}

impl ValidatorConfig {
    /// Validate an IDF file.
    pub fn idf(path: impl Into<PathBuf>) -> Self {
        Self {
            idf: Some(path.into()),
            ..Default::default()
        }
    }

    /// Validate a combined document.
    pub fn combined(path: impl Into<PathBuf>) -> Self {
        Self {
            combined: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_accession(mut self, accession: impl Into<String>) -> Self {
        self.accession = Some(accession.into());
        self
    }

    pub fn with_log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_prefix = Some(prefix.into());
        self
    }

    pub fn with_check_module(mut self, spec: CheckModuleSpec) -> Self {
        self.check_modules.push(spec);
        self
    }

    pub fn with_skip_data_checks(mut self, skip: bool) -> Self {
        self.skip_data_checks = skip;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_report_sink(mut self, sink: SharedReportSink) -> Self {
        self.report_sink = Some(sink);
        self
    }

    pub fn with_atlas_report_sink(mut self, sink: SharedReportSink) -> Self {
        self.atlas_report_sink = Some(sink);
        self
    }

    /// The file named on input, whichever form was given.
    pub fn input(&self) -> Option<&Path> {
        self.idf.as_deref().or(self.combined.as_deref())
    }

    /// Check the configuration without touching the filesystem.
    pub fn validate(&self, registry: &CheckModuleRegistry) -> Result<()> {
        match (&self.idf, &self.combined) {
            (Some(_), Some(_)) => {
                return Err(MagetabError::Config(
                    "an IDF file and a combined document cannot both be given".to_string(),
                ));
            }
            (None, None) => {
                return Err(MagetabError::Config(
                    "either an IDF file or a combined document is required".to_string(),
                ));
            }
            _ => {}
        }

        let mut seen = IndexSet::new();
        for spec in &self.check_modules {
            if spec.name == CORE_CHANNEL {
                return Err(MagetabError::Config(format!(
                    "check module name '{}' is reserved for the core channel",
                    spec.name
                )));
            }
            if !registry.contains(&spec.name) {
                return Err(MagetabError::UnknownCheckModule(spec.name.clone()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(MagetabError::Config(format!(
                    "check module '{}' requested more than once",
                    spec.name
                )));
            }
        }

        Ok(())
    }

    /// Data directory: the configured one, or the input's parent directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.data_dir {
            return dir.clone();
        }
        match self.input().and_then(|p| p.parent()) {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Log file for a channel: `<prefix>_<input base name>.log`.
    pub fn log_file(&self, prefix: &str) -> PathBuf {
        let base = self
            .input()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        PathBuf::from(format!("{}_{}.log", prefix, base))
    }
}

impl std::fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("idf", &self.idf)
            .field("combined", &self.combined)
            .field("data_dir", &self.data_dir)
            .field("accession", &self.accession)
            .field("log_prefix", &self.log_prefix)
            .field("check_modules", &self.check_modules)
            .field("skip_data_checks", &self.skip_data_checks)
            .field("verbose", &self.verbose)
            .field("report_sink", &self.report_sink.is_some())
            .field("atlas_report_sink", &self.atlas_report_sink.is_some())
            .finish()
    }
}
