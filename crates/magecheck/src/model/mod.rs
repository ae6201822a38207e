//! Lightweight data model produced by the naive parsers.

mod full;
mod investigation;
mod matrix;
mod sheet;

pub use full::{FullAssay, FullModel, ModelBuilder};
pub use investigation::{Comment, ControlledTerm, Investigation, Publication, SampleSheetReference};
pub use matrix::{DataMatrix, DataMatrixColumn};
pub use sheet::{DataFileEntry, DataFileKind, Node, NodeKind, NodeSets, SimpleSdrf};
