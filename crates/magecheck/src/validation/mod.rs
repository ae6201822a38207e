//! Validation of naively parsed submissions.

mod consistency;
mod data_files;
mod finding;
mod technology;

pub use consistency::ConsistencyValidator;
pub use data_files::{DataFileChecker, DataFileReport};
pub use finding::{Finding, FindingType};
pub use technology::check_technology_types;
