//! Pluggable check modules.
//!
//! A check module adds domain-specific rules at fixed points of the pipeline.
//! Every hook has a no-op default, so a module implements only the hooks it
//! needs. Each module records to its own status channel, named after it.
//!
//! # Example
//!
//! ```
//! use magecheck::checks::{CheckModule, CheckModuleRegistry};
//! use magecheck::model::Investigation;
//! use magecheck::status::Channel;
//!
//! struct NeedsDescription;
//!
//! impl CheckModule for NeedsDescription {
//!     fn name(&self) -> &str {
//!         "description"
//!     }
//!
//!     fn run_idf_checks(&mut self, investigation: &mut Investigation, channel: &mut Channel) {
//!         if investigation.description.is_none() {
//!             channel.error("Experiment Description is missing");
//!         }
//!     }
//! }
//!
//! let mut registry = CheckModuleRegistry::new();
//! registry.register("description", || Box::new(NeedsDescription));
//! assert!(registry.contains("description"));
//! ```

mod archive;
mod atlas;
mod registry;

pub use archive::ArchiveChecks;
pub use atlas::{AtlasChecks, ATLAS_NOT_PERFORMED_CODE, ATLAS_NOT_PERFORMED_MESSAGE};
pub use registry::{CheckModuleFactory, CheckModuleRegistry, ARCHIVE_MODULE, ATLAS_MODULE};

use crate::model::{DataFileEntry, FullModel, Investigation, SimpleSdrf};
use crate::status::Channel;

/// A validator plugged into the pipeline.
///
/// Hooks run in this order: [`set_investigation`](Self::set_investigation),
/// [`run_idf_checks`](Self::run_idf_checks),
/// [`additional_files`](Self::additional_files),
/// [`add_simple_sdrf`](Self::add_simple_sdrf) once per sample sheet,
/// [`run_simple_sdrf_checks`](Self::run_simple_sdrf_checks) when at least one
/// sample sheet exists, then [`set_full_model`](Self::set_full_model) and
/// [`run_full_sdrf_checks`](Self::run_full_sdrf_checks) when the full parse
/// succeeded.
pub trait CheckModule {
    /// Module name; also the name of its status channel.
    fn name(&self) -> &str;

    /// Called once the investigation has been read.
    fn set_investigation(&mut self, _investigation: &Investigation) {}

    /// Investigation-level checks. The module may amend the investigation.
    fn run_idf_checks(&mut self, _investigation: &mut Investigation, _channel: &mut Channel) {}

    /// Extra data files to include in the existence check.
    fn additional_files(&mut self, _channel: &mut Channel) -> Vec<DataFileEntry> {
        Vec::new()
    }

    /// Called once per naively parsed sample sheet.
    fn add_simple_sdrf(&mut self, _sdrf: &SimpleSdrf) {}

    /// Checks over all sample sheets seen so far.
    fn run_simple_sdrf_checks(&mut self, _channel: &mut Channel) {}

    /// Called with the result of a successful full parse.
    fn set_full_model(&mut self, _model: &FullModel) {}

    /// Checks against the full model.
    fn run_full_sdrf_checks(&mut self, _channel: &mut Channel) {}

    /// Told that the naive stages failed and no full parse will happen.
    fn record_checks_not_performed(&mut self, _channel: &mut Channel) {}
}
