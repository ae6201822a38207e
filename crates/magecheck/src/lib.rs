//! magecheck: staged validation of MAGE-TAB submissions.
//!
//! A submission is an IDF (investigation description), one or more SDRFs
//! (sample sheets) and the data files they reference. Validation runs in
//! stages: cheap naive parses of each file first, cross-file consistency
//! checks over data matrix headers, and only when those pass, a full parse
//! through a pluggable [`ModelBuilder`].
//!
//! # Core Principles
//!
//! - **Record, don't throw**: problems in a submission are counted on named
//!   status channels; only misconfiguration and unsplittable input are errors
//! - **Pluggable checks**: extra rules come from [`checks::CheckModule`]s,
//!   each with its own channel
//! - **No leftovers**: temp files from splitting are removed on every exit path
//!
//! # Example
//!
//! ```no_run
//! use magecheck::{CheckModuleRegistry, TabularModelBuilder, Validator, ValidatorConfig};
//!
//! let config = ValidatorConfig::idf("E-MTAB-1234.idf.txt").with_accession("E-MTAB-1234");
//! let registry = CheckModuleRegistry::with_builtins();
//! let mut validator =
//!     Validator::new(config, &registry, Box::new(TabularModelBuilder::new())).unwrap();
//!
//! validator.parse().unwrap();
//! validator.print_status(None).unwrap();
//! ```

pub mod checks;
pub mod error;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod status;
pub mod validation;

mod builder;

pub use builder::TabularModelBuilder;
pub use checks::{CheckModule, CheckModuleRegistry};
pub use error::{MagetabError, Result};
pub use model::{FullModel, Investigation, ModelBuilder, SimpleSdrf};
pub use pipeline::{CheckModuleSpec, Stage, Validator, ValidatorConfig};
pub use status::{ChannelRegistry, ChannelStatus, ReportSink, Severity, TextReport, CORE_CHANNEL};
pub use validation::{Finding, FindingType};
