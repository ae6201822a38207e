//! Validation findings recorded on status channels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::NodeKind;

/// Type of finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    /// Two columns share node key and quantitation type.
    DuplicateColumn,
    /// A matrix column references a node missing from the sample sheets.
    NodeNotFound,
    /// Adjacent node keys carry different quantitation type sets.
    InconsistentQuantitationTypes,
    /// An assay has no registered technology type after the full parse.
    MissingTechnologyType,
    /// A data file does not exist.
    MissingDataFile,
    /// A data file has zero length.
    EmptyDataFile,
    /// A data file exists but cannot be opened.
    UnreadableDataFile,
}

impl FindingType {
    /// Get a human-readable label for the finding type.
    pub fn label(&self) -> &'static str {
        match self {
            FindingType::DuplicateColumn => "Duplicate Column",
            FindingType::NodeNotFound => "Node Not Found",
            FindingType::InconsistentQuantitationTypes => "Inconsistent Quantitation Types",
            FindingType::MissingTechnologyType => "Missing Technology Type",
            FindingType::MissingDataFile => "Missing Data File",
            FindingType::EmptyDataFile => "Empty Data File",
            FindingType::UnreadableDataFile => "Unreadable Data File",
        }
    }
}

/// A problem found in a submission. Always recorded at error severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Finding {
    DuplicateColumn {
        matrix: String,
        node_key: String,
        quantitation_type: String,
    },
    NodeNotFound {
        matrix: String,
        column: usize,
        kind: NodeKind,
        name: String,
    },
    InconsistentQuantitationTypes {
        matrix: String,
        previous_key: String,
        previous_types: Vec<String>,
        key: String,
        types: Vec<String>,
    },
    MissingTechnologyType {
        assay: String,
    },
    MissingDataFile {
        file: String,
    },
    EmptyDataFile {
        file: String,
    },
    UnreadableDataFile {
        file: String,
        reason: String,
    },
}

impl Finding {
    pub fn finding_type(&self) -> FindingType {
        match self {
            Finding::DuplicateColumn { .. } => FindingType::DuplicateColumn,
            Finding::NodeNotFound { .. } => FindingType::NodeNotFound,
            Finding::InconsistentQuantitationTypes { .. } => {
                FindingType::InconsistentQuantitationTypes
            }
            Finding::MissingTechnologyType { .. } => FindingType::MissingTechnologyType,
            Finding::MissingDataFile { .. } => FindingType::MissingDataFile,
            Finding::EmptyDataFile { .. } => FindingType::EmptyDataFile,
            Finding::UnreadableDataFile { .. } => FindingType::UnreadableDataFile,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::DuplicateColumn {
                matrix,
                node_key,
                quantitation_type,
            } => write!(
                f,
                "Data matrix {}: duplicate quantitation type '{}' for node(s) '{}'",
                matrix, quantitation_type, node_key
            ),
            Finding::NodeNotFound {
                matrix,
                column,
                kind,
                name,
            } => write!(
                f,
                "Data matrix {} column {}: {} '{}' not found in SDRF",
                matrix, column, kind, name
            ),
            Finding::InconsistentQuantitationTypes {
                matrix,
                previous_key,
                previous_types,
                key,
                types,
            } => write!(
                f,
                "Data matrix {}: quantitation types for '{}' ({}) differ from those for '{}' ({})",
                matrix,
                key,
                types.join(", "),
                previous_key,
                previous_types.join(", ")
            ),
            Finding::MissingTechnologyType { assay } => {
                write!(f, "Assay '{}' has no valid Technology Type", assay)
            }
            Finding::MissingDataFile { file } => write!(f, "Data file '{}' not found", file),
            Finding::EmptyDataFile { file } => write!(f, "Data file '{}' is empty", file),
            Finding::UnreadableDataFile { file, reason } => {
                write!(f, "Data file '{}' cannot be read: {}", file, reason)
            }
        }
    }
}
