//! Tab-delimited record reading shared by the naive parsers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MagetabError, Result};

/// Whitespace just inside square brackets, e.g. `Comment[ Foo ]`.
static BRACKET_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*([^\]]*?)\s*\]").expect("valid bracket pattern"));

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Quote character.
    pub quote: u8,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            quote: b'"',
            comment: Some(b'#'),
        }
    }
}

/// Reads MAGE-TAB style tab-delimited files into rows of cells.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Build a streaming record reader over `reader`.
    pub fn reader<R: Read>(&self, reader: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .quote(self.config.quote)
            .comment(self.config.comment)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
    }

    /// Open `path` for streaming.
    pub fn open(&self, path: &Path) -> Result<csv::Reader<File>> {
        let file = File::open(path).map_err(|e| MagetabError::io(path, e))?;
        Ok(self.reader(file))
    }

    /// Read every row of `path`. Trailing empty cells are dropped and
    /// blank rows are skipped.
    pub fn read_rows(&self, path: &Path) -> Result<Vec<Vec<String>>> {
        let mut reader = self.open(path)?;
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result.map_err(|e| MagetabError::parse(path, e.to_string()))?;
            let row = trim_row(record.iter().map(|s| s.to_string()).collect());
            if !row.is_empty() {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

/// Drop trailing empty cells.
pub fn trim_row(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|c| c.trim().is_empty()) {
        row.pop();
    }
    row
}

/// Collapse whitespace just inside brackets: `[ X ]`, `[ X]`, `[X ]` become `[X]`.
pub fn normalize_brackets(cell: &str) -> String {
    BRACKET_SPACE.replace_all(cell, "[$1]").into_owned()
}

/// Matching key for a tag or header: lowercase, no whitespace, without a
/// single enclosing pair of brackets.
///
/// `"[SDRF File]"`, `"SDRF File"` and `"sdrffile"` all map to `"sdrffile"`.
pub fn tag_key(cell: &str) -> String {
    let trimmed = cell.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .filter(|s| !s.contains('[') && !s.contains(']'))
        .unwrap_or(trimmed);

    inner
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Bracketed qualifier of a `Prefix[qualifier]` cell, when the part before
/// the bracket matches `prefix` (compared via [`tag_key`]).
///
/// `bracket_qualifier("Comment[ ArrayExpressAccession ]", "comment")`
/// returns `Some("ArrayExpressAccession")`.
pub fn bracket_qualifier<'a>(cell: &'a str, prefix: &str) -> Option<&'a str> {
    let cell = cell.trim();
    let open = cell.find('[')?;
    let inner = cell[open + 1..].strip_suffix(']')?;
    if tag_key(&cell[..open]) == prefix {
        Some(inner.trim())
    } else {
        None
    }
}
