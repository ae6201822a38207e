//! External report sinks receiving section-demarcated narrative text.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{MagetabError, Result};

use super::channel::Severity;

/// Destination for the human-readable validation report.
pub trait ReportSink {
    /// Close the current section (if any) and open a new one.
    fn open_section(&mut self, name: &str);

    /// Append a record to the currently open section.
    fn write(&mut self, severity: Severity, message: &str);
}

/// A report sink shared between several channels.
pub type SharedReportSink = Arc<Mutex<dyn ReportSink + Send>>;

/// Writes the report as plain text.
///
/// ```text
/// == IDF parsing ==
/// [WARN] No SDRF files found in IDF
/// ```
pub struct TextReport {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl TextReport {
    /// Create (or truncate) the report file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| MagetabError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    /// Wrap the report for sharing between channels.
    pub fn shared(self) -> SharedReportSink {
        Arc::new(Mutex::new(self))
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{}", line) {
            log::debug!("Could not write report {}: {}", self.path.display(), e);
        }
    }
}

impl ReportSink for TextReport {
    fn open_section(&mut self, name: &str) {
        self.write_line("");
        self.write_line(&format!("== {} ==", name));
    }

    fn write(&mut self, severity: Severity, message: &str) {
        if severity == Severity::Report {
            self.write_line(message);
        } else {
            self.write_line(&format!("[{}] {}", severity.label(), message));
        }
    }
}

impl Drop for TextReport {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// One record captured by a [`MemoryReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Section open when the record arrived.
    pub section: Option<String>,
    pub severity: Severity,
    pub message: String,
}

/// Keeps the report in memory.
#[derive(Debug, Default)]
pub struct MemoryReport {
    current: Option<String>,
    sections: Vec<String>,
    entries: Vec<ReportEntry>,
}

impl MemoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sections in the order they were opened.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Entries recorded under the named section.
    pub fn section_entries<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ReportEntry> {
        self.entries
            .iter()
            .filter(move |e| e.section.as_deref() == Some(name))
    }
}

impl ReportSink for MemoryReport {
    fn open_section(&mut self, name: &str) {
        self.current = Some(name.to_string());
        self.sections.push(name.to_string());
    }

    fn write(&mut self, severity: Severity, message: &str) {
        self.entries.push(ReportEntry {
            section: self.current.clone(),
            severity,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_report_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        {
            let mut report = TextReport::create(&path).unwrap();
            report.open_section("IDF parsing");
            report.write(Severity::Warn, "no SDRF");
            report.open_section("Data files");
            report.write(Severity::Report, "3 files checked");
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("== IDF parsing ==\n[WARN] no SDRF"));
        assert!(contents.contains("== Data files ==\n3 files checked"));
    }

    #[test]
    fn test_memory_report_attributes_section() {
        let mut report = MemoryReport::new();
        report.write(Severity::Info, "before any section");
        report.open_section("SDRF parsing");
        report.write(Severity::Error, "bad");

        assert_eq!(report.entries()[0].section, None);
        assert_eq!(report.section_entries("SDRF parsing").count(), 1);
        assert_eq!(report.sections(), &["SDRF parsing".to_string()]);
    }
}
