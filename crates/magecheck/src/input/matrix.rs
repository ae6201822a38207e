//! Naive data matrix reader.
//!
//! Only the header is read. A matrix header has one or more node rows and a
//! quantitation type row:
//!
//! ```text
//! Hybridization REF   assay1   assay1   assay2
//! Reporter REF        signal   pvalue   signal
//! probe_1             1.0      0.01     2.0
//! ```
//!
//! Body rows are never examined.

use std::path::Path;

use crate::error::{MagetabError, Result};
use crate::model::{DataMatrix, DataMatrixColumn, Node, NodeKind};

use super::parser::{normalize_brackets, tag_key, trim_row, Parser};

/// Labels opening the quantitation type row.
const DESIGN_ELEMENT_LABELS: &[&str] = &["reporterref", "compositeelementref", "designelementref"];

fn node_kind(label: &str) -> Option<NodeKind> {
    let kind = match tag_key(label).as_str() {
        "hybridizationref" | "hybridizationname" | "assayref" | "assayname" => NodeKind::Assay,
        "scanref" | "scanname" => NodeKind::DataAcquisition,
        "normalizationref" | "normalizationname" => NodeKind::Normalization,
        k if k.ends_with("ref") || k.ends_with("name") => NodeKind::Other(label.trim().to_string()),
        _ => return None,
    };
    Some(kind)
}

/// Reads data matrix headers into a [`DataMatrix`].
#[derive(Debug, Clone, Default)]
pub struct MatrixReader {
    parser: Parser,
}

impl MatrixReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the header of the matrix at `path`.
    pub fn read(&self, path: &Path) -> Result<DataMatrix> {
        let mut reader = self.parser.open(path)?;
        let mut node_rows: Vec<(NodeKind, Vec<String>)> = Vec::new();
        let mut qt_row: Option<Vec<String>> = None;

        for result in reader.records() {
            let record = result.map_err(|e| MagetabError::parse(path, e.to_string()))?;
            let row = trim_row(record.iter().map(|s| s.to_string()).collect());
            if row.is_empty() {
                continue;
            }

            let label = normalize_brackets(row[0].trim());
            if DESIGN_ELEMENT_LABELS.contains(&tag_key(&label).as_str()) {
                qt_row = Some(row);
                break;
            }

            match node_kind(&label) {
                Some(kind) => node_rows.push((kind, row)),
                None => {
                    return Err(MagetabError::parse(
                        path,
                        format!("unexpected header row '{}'", label),
                    ))
                }
            }
        }

        let qt_row = qt_row
            .ok_or_else(|| MagetabError::parse(path, "no quantitation type header row found"))?;
        if node_rows.is_empty() {
            return Err(MagetabError::parse(path, "no node reference header row found"));
        }

        let mut columns = Vec::with_capacity(qt_row.len().saturating_sub(1));
        for (col, qt) in qt_row.iter().enumerate().skip(1) {
            let qt = qt.trim();
            if qt.is_empty() {
                return Err(MagetabError::parse(
                    path,
                    format!("column {} has no quantitation type", col + 1),
                ));
            }

            let nodes: Vec<Node> = node_rows
                .iter()
                .filter_map(|(kind, row)| {
                    let name = row.get(col)?.trim();
                    (!name.is_empty()).then(|| Node::new(kind.clone(), name))
                })
                .collect();
            if nodes.is_empty() {
                return Err(MagetabError::parse(
                    path,
                    format!("column {} has no node reference", col + 1),
                ));
            }

            columns.push(DataMatrixColumn {
                index: col + 1,
                quantitation_type: qt.to_string(),
                nodes,
            });
        }

        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(DataMatrix { file, columns })
    }
}
