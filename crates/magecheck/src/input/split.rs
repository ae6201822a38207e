//! Splits a combined MAGE-TAB document into separate IDF and SDRF files.
//!
//! A combined document holds both parts in one file:
//!
//! ```text
//! [IDF]
//! Investigation Title    My experiment
//! ...
//! [SDRF]
//! Source Name    Characteristics[organism]    ...
//! ```
//!
//! The `[SDRF]` marker is replaced in the IDF output by an `SDRF File` row
//! pointing at the written sample sheet.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Local;

use crate::error::{MagetabError, Result};

use super::parser::{normalize_brackets, Parser, ParserConfig};

/// Marker opening the IDF section.
pub const IDF_MARKER: &str = "[IDF]";
/// Marker opening the SDRF section.
pub const SDRF_MARKER: &str = "[SDRF]";
/// Tag of the row that replaces the `[SDRF]` marker.
pub const SDRF_FILE_TAG: &str = "SDRF File";

/// Absolute paths of the files written by a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    pub idf: PathBuf,
    pub sdrf: PathBuf,
}

/// Splits made by this process, so temp names never repeat.
static SPLIT_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Splits combined documents.
///
/// Rows starting with `#` are copied through like any other row.
#[derive(Debug, Clone)]
pub struct DocumentSplitter {
    parser: Parser,
}

impl Default for DocumentSplitter {
    fn default() -> Self {
        Self {
            parser: Parser::with_config(ParserConfig {
                comment: None,
                ..ParserConfig::default()
            }),
        }
    }
}

impl DocumentSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output paths in `dir`, named after `combined` with a timestamp, the
    /// process id and a per-process counter.
    ///
    /// `exp.txt` becomes `exp.20240101120000123-4242-0.idf.txt` and
    /// `exp.20240101120000123-4242-0.sdrf.txt`.
    pub fn temp_paths(combined: &Path, dir: &Path) -> (PathBuf, PathBuf) {
        let stem = combined
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "magetab".to_string());
        let stamp = format!(
            "{}-{}-{}",
            Local::now().format("%Y%m%d%H%M%S%3f"),
            std::process::id(),
            SPLIT_COUNTER.fetch_add(1, Ordering::Relaxed)
        );

        (
            dir.join(format!("{}.{}.idf.txt", stem, stamp)),
            dir.join(format!("{}.{}.sdrf.txt", stem, stamp)),
        )
    }

    /// Split `combined` into `idf_out` and `sdrf_out`.
    ///
    /// On any failure both outputs are removed before the error is returned.
    pub fn split(&self, combined: &Path, idf_out: &Path, sdrf_out: &Path) -> Result<SplitOutput> {
        let result = self.split_into(combined, idf_out, sdrf_out);

        if result.is_err() {
            for path in [idf_out, sdrf_out] {
                if path.exists() {
                    if let Err(e) = fs::remove_file(path) {
                        log::warn!("Could not remove partial output {}: {}", path.display(), e);
                    }
                }
            }
        }

        result
    }

    fn split_into(&self, combined: &Path, idf_out: &Path, sdrf_out: &Path) -> Result<SplitOutput> {
        let mut reader = self.parser.open(combined)?;
        let mut idf_writer = tab_writer(idf_out)?;
        let mut sdrf_writer = tab_writer(sdrf_out)?;

        let sdrf_name = sdrf_out
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut seen_idf = false;
        let mut in_idf = false;
        let mut in_sdrf = false;
        let mut sdrf_header_pending = true;

        for result in reader.records() {
            let record = result.map_err(|e| MagetabError::parse(combined, e.to_string()))?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            if row.is_empty() {
                continue;
            }

            if in_sdrf {
                if sdrf_header_pending {
                    row = row.iter().map(|c| normalize_brackets(c)).collect();
                    sdrf_header_pending = false;
                }
                sdrf_writer.write_record(&row)?;
                continue;
            }

            let first = normalize_brackets(row[0].trim());
            if first == IDF_MARKER {
                seen_idf = true;
                in_idf = true;
                continue;
            }

            if !in_idf {
                log::debug!("Skipping row outside [IDF] section: {}", first);
                continue;
            }

            if first == SDRF_MARKER {
                idf_writer.write_record([SDRF_FILE_TAG, sdrf_name.as_str()])?;
                in_idf = false;
                in_sdrf = true;
                continue;
            }

            row[0] = first;
            idf_writer.write_record(&row)?;
        }

        if !seen_idf {
            return Err(MagetabError::SplitFormat {
                path: combined.to_path_buf(),
            });
        }

        idf_writer.flush().map_err(|e| MagetabError::io(idf_out, e))?;
        sdrf_writer.flush().map_err(|e| MagetabError::io(sdrf_out, e))?;

        Ok(SplitOutput {
            idf: fs::canonicalize(idf_out).map_err(|e| MagetabError::io(idf_out, e))?,
            sdrf: fs::canonicalize(sdrf_out).map_err(|e| MagetabError::io(sdrf_out, e))?,
        })
    }
}

fn tab_writer(path: &Path) -> Result<csv::Writer<File>> {
    let file = File::create(path).map_err(|e| MagetabError::io(path, e))?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(file))
}
