//! A single status channel and its sinks.

use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{MagetabError, Result};

use super::report::SharedReportSink;

/// Severity of a status record.
///
/// `Report` is narrative text for the report sink. It never reaches the
/// console or log file and never changes the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Report,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Report => "REPORT",
        }
    }

    fn log_level(&self) -> Option<log::Level> {
        match self {
            Severity::Debug => Some(log::Level::Debug),
            Severity::Info => Some(log::Level::Info),
            Severity::Warn => Some(log::Level::Warn),
            Severity::Error => Some(log::Level::Error),
            Severity::Report => None,
        }
    }
}

/// Options applied when a channel is first created.
#[derive(Clone, Default)]
pub struct ChannelOptions {
    /// Lower the console and file thresholds from warn to debug.
    pub verbose: bool,
    /// Append records to this file.
    pub log_file: Option<PathBuf>,
    /// Forward records to this report sink.
    pub report_sink: Option<SharedReportSink>,
}

impl ChannelOptions {
    /// Create default options (warn threshold, console only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Attach a log file.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Attach a report sink.
    pub fn with_report_sink(mut self, sink: Option<SharedReportSink>) -> Self {
        self.report_sink = sink;
        self
    }
}

struct FileSink {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl FileSink {
    fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| MagetabError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: LineWriter::new(file),
        })
    }

    fn write(&mut self, severity: Severity, message: &str) {
        let line = format!(
            "{} {}: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            severity.label(),
            message
        );
        if let Err(e) = self.writer.write_all(line.as_bytes()) {
            log::debug!("Could not write to log file {}: {}", self.path.display(), e);
        }
    }
}

/// A named accumulator of warning and error counts.
pub struct Channel {
    name: String,
    warnings: usize,
    errors: usize,
    threshold: Severity,
    file: Option<FileSink>,
    report: Option<SharedReportSink>,
}

impl Channel {
    /// Create a channel, opening its log file if one is configured.
    pub fn new(name: impl Into<String>, options: ChannelOptions) -> Result<Self> {
        let file = match options.log_file {
            Some(ref path) => Some(FileSink::open(path)?),
            None => None,
        };

        Ok(Self {
            name: name.into(),
            warnings: 0,
            errors: 0,
            threshold: if options.verbose {
                Severity::Debug
            } else {
                Severity::Warn
            },
            file,
            report: options.report_sink,
        })
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of warnings recorded since creation or the last reset.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Number of errors recorded since creation or the last reset.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Path of the log file, if this channel writes one.
    pub fn log_file(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path.as_path())
    }

    /// Zero both counters.
    pub fn reset(&mut self) {
        self.warnings = 0;
        self.errors = 0;
    }

    /// Record a message and fan it out to the attached sinks.
    pub fn record(&mut self, severity: Severity, message: impl AsRef<str>) {
        let message = message.as_ref();

        match severity {
            Severity::Warn => self.warnings += 1,
            Severity::Error => self.errors += 1,
            _ => {}
        }

        if let Some(level) = severity.log_level() {
            if severity >= self.threshold {
                log::log!(target: "magecheck", level, "[{}] {}", self.name, message);
                if let Some(ref mut file) = self.file {
                    file.write(severity, message);
                }
            }
        }

        if severity >= Severity::Info {
            if let Some(ref sink) = self.report {
                if let Ok(mut sink) = sink.lock() {
                    sink.write(severity, message);
                }
            }
        }
    }

    /// Open a new section in the report sink, closing the previous one.
    pub fn open_section(&mut self, name: &str) {
        if let Some(ref sink) = self.report {
            if let Ok(mut sink) = sink.lock() {
                sink.open_section(name);
            }
        }
    }

    pub fn debug(&mut self, message: impl AsRef<str>) {
        self.record(Severity::Debug, message);
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.record(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.record(Severity::Warn, message);
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.record(Severity::Error, message);
    }

    pub fn report(&mut self, message: impl AsRef<str>) {
        self.record(Severity::Report, message);
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("warnings", &self.warnings)
            .field("errors", &self.errors)
            .field("threshold", &self.threshold)
            .finish()
    }
}
