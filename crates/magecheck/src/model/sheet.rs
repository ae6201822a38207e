//! Sample sheet (SDRF) structures: nodes and data files.

use std::fmt;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Kind of a processing node.
///
/// Sample sheets only produce the first three kinds. `Other` carries the
/// header label of a data-matrix reference whose kind is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Assay,
    DataAcquisition,
    Normalization,
    Other(String),
}

impl NodeKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Assay => "Assay",
            NodeKind::DataAcquisition => "Scan",
            NodeKind::Normalization => "Normalization",
            NodeKind::Other(label) => label,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named, typed node. Identity is (kind, name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Node names gathered from sample sheets, one disjoint set per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSets {
    pub assays: IndexSet<String>,
    pub data_acquisitions: IndexSet<String>,
    pub normalizations: IndexSet<String>,
}

impl NodeSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup table for a kind, or `None` when the kind has no list.
    pub fn for_kind(&self, kind: &NodeKind) -> Option<&IndexSet<String>> {
        match kind {
            NodeKind::Assay => Some(&self.assays),
            NodeKind::DataAcquisition => Some(&self.data_acquisitions),
            NodeKind::Normalization => Some(&self.normalizations),
            NodeKind::Other(_) => None,
        }
    }

    /// Add a node. Returns false for kinds that have no list.
    pub fn insert(&mut self, kind: &NodeKind, name: impl Into<String>) -> bool {
        let set = match kind {
            NodeKind::Assay => &mut self.assays,
            NodeKind::DataAcquisition => &mut self.data_acquisitions,
            NodeKind::Normalization => &mut self.normalizations,
            NodeKind::Other(_) => return false,
        };
        set.insert(name.into());
        true
    }

    /// Whether a node is known. `None` when its kind has no list.
    pub fn contains(&self, node: &Node) -> Option<bool> {
        self.for_kind(&node.kind).map(|set| set.contains(&node.name))
    }

    /// Merge in nodes from another sample sheet.
    pub fn extend(&mut self, other: &NodeSets) {
        self.assays.extend(other.assays.iter().cloned());
        self.data_acquisitions
            .extend(other.data_acquisitions.iter().cloned());
        self.normalizations.extend(other.normalizations.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.assays.is_empty() && self.data_acquisitions.is_empty() && self.normalizations.is_empty()
    }
}

/// Classification of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFileKind {
    /// `Array Data File` or `Array Data Matrix File`.
    Raw,
    /// `Derived Array Data File`.
    Processed,
    /// `Derived Array Data Matrix File`, naively parsed.
    Transformed,
    /// Contributed by a check module.
    Additional,
}

impl DataFileKind {
    pub fn label(&self) -> &'static str {
        match self {
            DataFileKind::Raw => "raw",
            DataFileKind::Processed => "processed",
            DataFileKind::Transformed => "transformed",
            DataFileKind::Additional => "additional",
        }
    }
}

impl fmt::Display for DataFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A data file referenced by a sample sheet or contributed by a check module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataFileEntry {
    pub name: String,
    pub kind: DataFileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_design: Option<String>,
}

impl DataFileEntry {
    pub fn new(name: impl Into<String>, kind: DataFileKind) -> Self {
        Self {
            name: name.into(),
            kind,
            array_design: None,
        }
    }

    pub fn with_array_design(mut self, label: impl Into<String>) -> Self {
        self.array_design = Some(label.into());
        self
    }
}

/// What the naive reader extracts from one sample sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleSdrf {
    /// File the sheet was read from.
    pub path: PathBuf,
    /// Distinct data files in order of first appearance.
    pub data_files: IndexSet<DataFileEntry>,
    pub nodes: NodeSets,
    /// Array design label to the files that use it.
    pub array_designs: IndexMap<String, IndexSet<String>>,
    /// Distinct `Technology Type` values.
    pub technology_types: IndexSet<String>,
}

impl SimpleSdrf {
    /// Data files of the given kind.
    pub fn files_of_kind(&self, kind: DataFileKind) -> impl Iterator<Item = &DataFileEntry> {
        self.data_files.iter().filter(move |f| f.kind == kind)
    }
}
