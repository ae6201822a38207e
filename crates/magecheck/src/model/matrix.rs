//! Data matrix column metadata.

use serde::{Deserialize, Serialize};

use super::sheet::Node;

/// One value column of a data matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMatrixColumn {
    /// 1-based column number in the file.
    pub index: usize,
    pub quantitation_type: String,
    /// Nodes this column belongs to, in header order.
    pub nodes: Vec<Node>,
}

impl DataMatrixColumn {
    /// Semicolon-joined names of the referenced nodes.
    pub fn node_key(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Column metadata of one data matrix file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMatrix {
    /// Name of the source file.
    pub file: String,
    pub columns: Vec<DataMatrixColumn>,
}
