//! Cross-file consistency between data matrices and sample sheets.

use indexmap::{IndexMap, IndexSet};

use crate::model::{DataMatrix, NodeSets};

use super::finding::Finding;

/// Checks data matrix columns against the nodes found in the sample sheets.
pub struct ConsistencyValidator<'a> {
    nodes: &'a NodeSets,
}

impl<'a> ConsistencyValidator<'a> {
    /// Create a validator over the merged nodes of every sample sheet.
    pub fn new(nodes: &'a NodeSets) -> Self {
        Self { nodes }
    }

    /// Run all checks on one matrix.
    pub fn validate(&self, matrix: &DataMatrix) -> Vec<Finding> {
        let mut findings = Vec::new();

        let key_types = self.check_duplicates(matrix, &mut findings);
        self.check_nodes(matrix, &mut findings);
        self.check_quantitation_types(matrix, &key_types, &mut findings);

        findings
    }

    /// Group quantitation types by node key, in order of first appearance.
    fn check_duplicates(
        &self,
        matrix: &DataMatrix,
        findings: &mut Vec<Finding>,
    ) -> IndexMap<String, IndexSet<String>> {
        let mut key_types: IndexMap<String, IndexSet<String>> = IndexMap::new();

        for column in &matrix.columns {
            let key = column.node_key();
            let types = key_types.entry(key.clone()).or_default();
            if !types.insert(column.quantitation_type.clone()) {
                findings.push(Finding::DuplicateColumn {
                    matrix: matrix.file.clone(),
                    node_key: key,
                    quantitation_type: column.quantitation_type.clone(),
                });
            }
        }

        key_types
    }

    fn check_nodes(&self, matrix: &DataMatrix, findings: &mut Vec<Finding>) {
        for column in &matrix.columns {
            for node in &column.nodes {
                if self.nodes.contains(node) != Some(true) {
                    findings.push(Finding::NodeNotFound {
                        matrix: matrix.file.clone(),
                        column: column.index,
                        kind: node.kind.clone(),
                        name: node.name.clone(),
                    });
                }
            }
        }
    }

    /// Compare each node key's type set with the one before it.
    ///
    /// Only adjacent keys are compared, so with sets {A,B}, {A}, {A,B} the
    /// first and last keys are never compared against each other.
    fn check_quantitation_types(
        &self,
        matrix: &DataMatrix,
        key_types: &IndexMap<String, IndexSet<String>>,
        findings: &mut Vec<Finding>,
    ) {
        let mut previous: Option<(&String, Vec<String>)> = None;

        for (key, types) in key_types {
            let mut sorted: Vec<String> = types.iter().cloned().collect();
            sorted.sort();

            if let Some((previous_key, previous_types)) = &previous {
                if *previous_types != sorted {
                    findings.push(Finding::InconsistentQuantitationTypes {
                        matrix: matrix.file.clone(),
                        previous_key: (*previous_key).clone(),
                        previous_types: previous_types.clone(),
                        key: key.clone(),
                        types: sorted.clone(),
                    });
                }
            }

            previous = Some((key, sorted));
        }
    }
}
