//! Naive SDRF reader.
//!
//! Reads only node names, data files, array design labels and technology
//! types from a sample sheet; the processing graph itself is not built.

use std::path::Path;

use crate::error::{MagetabError, Result};
use crate::model::{DataFileEntry, DataFileKind, NodeKind, SimpleSdrf};

use super::parser::{normalize_brackets, tag_key, Parser};

/// What a sample sheet column holds, as far as the naive reader cares.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ColumnRole {
    Node(NodeKind),
    File(DataFileKind),
    ArrayDesign,
    TechnologyType,
    Ignored,
}

impl ColumnRole {
    fn from_header(header: &str) -> Self {
        match tag_key(&normalize_brackets(header)).as_str() {
            "assayname" | "hybridizationname" => ColumnRole::Node(NodeKind::Assay),
            "scanname" => ColumnRole::Node(NodeKind::DataAcquisition),
            "normalizationname" => ColumnRole::Node(NodeKind::Normalization),
            "arraydatafile" | "arraydatamatrixfile" => ColumnRole::File(DataFileKind::Raw),
            "derivedarraydatafile" => ColumnRole::File(DataFileKind::Processed),
            "derivedarraydatamatrixfile" => ColumnRole::File(DataFileKind::Transformed),
            "arraydesignref" | "arraydesignfile" => ColumnRole::ArrayDesign,
            "technologytype" => ColumnRole::TechnologyType,
            _ => ColumnRole::Ignored,
        }
    }
}

/// Reads a sample sheet into a [`SimpleSdrf`].
#[derive(Debug, Clone, Default)]
pub struct SdrfReader {
    parser: Parser,
}

impl SdrfReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the sample sheet at `path`.
    pub fn read(&self, path: &Path) -> Result<SimpleSdrf> {
        let mut rows = self.parser.read_rows(path)?.into_iter();
        let header = rows
            .next()
            .ok_or_else(|| MagetabError::parse(path, "file contains no header row"))?;

        let roles: Vec<ColumnRole> = header.iter().map(|h| ColumnRole::from_header(h)).collect();
        if roles.iter().all(|r| *r == ColumnRole::Ignored) {
            log::debug!("No node or file columns in {}", path.display());
        }

        let mut sdrf = SimpleSdrf {
            path: path.to_path_buf(),
            ..Default::default()
        };

        for (row_idx, row) in rows.enumerate() {
            if row.len() > roles.len() {
                return Err(MagetabError::parse(
                    path,
                    format!(
                        "row {} has {} cells but the header has {}",
                        row_idx + 2,
                        row.len(),
                        roles.len()
                    ),
                ));
            }

            let mut files = Vec::new();
            let mut array_design: Option<&str> = None;

            for (role, value) in roles.iter().zip(row.iter()) {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                match role {
                    ColumnRole::Node(kind) => {
                        sdrf.nodes.insert(kind, value);
                    }
                    ColumnRole::File(kind) => files.push(DataFileEntry::new(value, *kind)),
                    ColumnRole::ArrayDesign => array_design = Some(value),
                    ColumnRole::TechnologyType => {
                        sdrf.technology_types.insert(value.to_string());
                    }
                    ColumnRole::Ignored => {}
                }
            }

            for mut file in files {
                if let Some(label) = array_design {
                    file.array_design = Some(label.to_string());
                    sdrf.array_designs
                        .entry(label.to_string())
                        .or_default()
                        .insert(file.name.clone());
                }
                sdrf.data_files.insert(file);
            }
        }

        Ok(sdrf)
    }
}
