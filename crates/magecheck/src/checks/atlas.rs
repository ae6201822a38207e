//! Checks for inclusion in the expression atlas.

use indexmap::IndexSet;

use crate::model::{DataFileKind, FullModel, Investigation, SimpleSdrf};
use crate::status::Channel;

use super::registry::ATLAS_MODULE;
use super::CheckModule;

/// Failure code recorded when the atlas checks were not run.
pub const ATLAS_NOT_PERFORMED_CODE: u32 = 999;
/// Message recorded alongside [`ATLAS_NOT_PERFORMED_CODE`].
pub const ATLAS_NOT_PERFORMED_MESSAGE: &str =
    "Atlas checks not performed - submission failed MAGE-TAB checks";

const MIN_ASSAYS: usize = 2;

/// Expression atlas eligibility checks.
#[derive(Debug, Default)]
pub struct AtlasChecks {
    array_designs: IndexSet<String>,
    has_expression_data: bool,
    assay_count: usize,
    fail_codes: Vec<u32>,
}

impl AtlasChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failure codes recorded so far.
    pub fn fail_codes(&self) -> &[u32] {
        &self.fail_codes
    }

    fn fail(&mut self, channel: &mut Channel, code: u32, message: &str) {
        self.fail_codes.push(code);
        channel.error(format!("Atlas fail code {}: {}", code, message));
    }
}

impl CheckModule for AtlasChecks {
    fn name(&self) -> &str {
        ATLAS_MODULE
    }

    fn run_idf_checks(&mut self, investigation: &mut Investigation, channel: &mut Channel) {
        channel.open_section("Atlas IDF checks");
        if investigation.experimental_factors.is_empty() {
            self.fail(channel, 1, "no experimental factors defined");
        }
    }

    fn add_simple_sdrf(&mut self, sdrf: &SimpleSdrf) {
        self.array_designs.extend(sdrf.array_designs.keys().cloned());
        self.has_expression_data |= sdrf.files_of_kind(DataFileKind::Transformed).next().is_some()
            || sdrf.files_of_kind(DataFileKind::Raw).next().is_some();
    }

    fn run_simple_sdrf_checks(&mut self, channel: &mut Channel) {
        channel.open_section("Atlas SDRF checks");

        if !self.has_expression_data {
            self.fail(channel, 2, "no raw or transformed data files");
        }
        if self.array_designs.len() > 1 {
            let designs: Vec<&str> = self.array_designs.iter().map(|s| s.as_str()).collect();
            self.fail(
                channel,
                3,
                &format!("more than one array design used: {}", designs.join(", ")),
            );
        }
    }

    fn set_full_model(&mut self, model: &FullModel) {
        self.assay_count = model.assays.len();
    }

    fn run_full_sdrf_checks(&mut self, channel: &mut Channel) {
        if self.assay_count < MIN_ASSAYS {
            self.fail(
                channel,
                4,
                &format!("at least {} assays required, found {}", MIN_ASSAYS, self.assay_count),
            );
        }
    }

    fn record_checks_not_performed(&mut self, channel: &mut Channel) {
        self.fail(channel, ATLAS_NOT_PERFORMED_CODE, ATLAS_NOT_PERFORMED_MESSAGE);
    }
}
