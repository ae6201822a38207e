//! Interface to the full semantic model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::investigation::{ControlledTerm, Investigation};

/// An assay as resolved by the full parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullAssay {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology_type: Option<ControlledTerm>,
}

/// The parts of the full experiment graph the pipeline inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullModel {
    pub investigation: Investigation,
    pub assays: Vec<FullAssay>,
    /// Controlled terms registered with the model.
    pub terms: Vec<ControlledTerm>,
}

impl FullModel {
    /// Whether `term` is registered with the model.
    pub fn has_term(&self, term: &ControlledTerm) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}

/// Builds the full semantic model of a submission.
///
/// Called at most once per pipeline run, and only when the naive stages
/// recorded no errors. The current directory is the submission's data
/// directory for the duration of the call.
pub trait ModelBuilder {
    /// Build the model from the IDF at `idf`.
    ///
    /// `investigation` is the naively parsed investigation, including any
    /// injected accession.
    fn build(&mut self, idf: &Path, investigation: &Investigation) -> Result<FullModel>;
}
