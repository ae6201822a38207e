//! Post-parse check on assay technology types.

use crate::model::FullModel;

use super::finding::Finding;

/// Every assay needs a technology type registered with the model.
///
/// A full parse can leave an assay pointing at a placeholder term that was
/// never registered, so presence alone is not enough.
pub fn check_technology_types(model: &FullModel) -> Vec<Finding> {
    model
        .assays
        .iter()
        .filter(|assay| {
            assay
                .technology_type
                .as_ref()
                .is_none_or(|term| !model.has_term(term))
        })
        .map(|assay| Finding::MissingTechnologyType {
            assay: assay.name.clone(),
        })
        .collect()
}
