//! Checks required for archive submission.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{DataFileEntry, DataFileKind, FullModel, Investigation, SimpleSdrf};
use crate::status::Channel;

use super::registry::ARCHIVE_MODULE;
use super::CheckModule;

/// Comment naming a supplementary data file in the IDF.
pub const ADDITIONAL_FILE_COMMENT: &str = "AdditionalFile:Data";

/// Technology types the archive accepts.
const KNOWN_TECHNOLOGY_TYPES: &[&str] = &[
    "array assay",
    "sequencing assay",
    "high_throughput_sequencing",
    "hybridization",
];

/// Titles the IDF reader invents for untitled publications.
static PLACEHOLDER_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^unknown \d+$").expect("valid placeholder pattern"));

/// Archive submission checks.
#[derive(Debug, Default)]
pub struct ArchiveChecks {
    additional_files: Vec<String>,
    assay_count: usize,
    sheets_without_files: Vec<PathBuf>,
    technology_types: Vec<(String, Option<String>)>,
}

impl ArchiveChecks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckModule for ArchiveChecks {
    fn name(&self) -> &str {
        ARCHIVE_MODULE
    }

    fn set_investigation(&mut self, investigation: &Investigation) {
        self.additional_files = investigation
            .comments_named(ADDITIONAL_FILE_COMMENT)
            .map(|s| s.to_string())
            .collect();
    }

    fn run_idf_checks(&mut self, investigation: &mut Investigation, channel: &mut Channel) {
        channel.open_section("Archive IDF checks");

        if investigation.title.is_none() {
            channel.error("Investigation Title is missing");
        }
        if investigation.description.is_none() {
            channel.error("Experiment Description is missing");
        }
        if investigation.experimental_factors.is_empty() {
            channel.error("No Experimental Factor Name found");
        }

        for publication in &investigation.publications {
            if PLACEHOLDER_TITLE.is_match(&publication.title) {
                channel.error(format!(
                    "Publication '{}' has no Publication Title",
                    publication.title
                ));
            }
        }
    }

    fn additional_files(&mut self, channel: &mut Channel) -> Vec<DataFileEntry> {
        if !self.additional_files.is_empty() {
            channel.debug(format!(
                "Adding {} additional file(s) from IDF comments",
                self.additional_files.len()
            ));
        }
        self.additional_files
            .iter()
            .map(|name| DataFileEntry::new(name.as_str(), DataFileKind::Additional))
            .collect()
    }

    fn add_simple_sdrf(&mut self, sdrf: &SimpleSdrf) {
        let assays = sdrf.nodes.assays.len();
        self.assay_count += assays;
        if assays > 0 && sdrf.data_files.is_empty() {
            self.sheets_without_files.push(sdrf.path.clone());
        }
    }

    fn run_simple_sdrf_checks(&mut self, channel: &mut Channel) {
        channel.open_section("Archive SDRF checks");

        if self.assay_count == 0 {
            channel.error("No assays found in any SDRF");
        }
        for path in &self.sheets_without_files {
            channel.error(format!("SDRF {} lists assays but no data files", path.display()));
        }
    }

    fn set_full_model(&mut self, model: &FullModel) {
        self.technology_types = model
            .assays
            .iter()
            .map(|a| (a.name.clone(), a.technology_type.as_ref().map(|t| t.value.clone())))
            .collect();
    }

    fn run_full_sdrf_checks(&mut self, channel: &mut Channel) {
        for (assay, technology) in &self.technology_types {
            match technology {
                Some(value) if KNOWN_TECHNOLOGY_TYPES.contains(&value.to_lowercase().as_str()) => {}
                Some(value) => channel.warn(format!(
                    "Assay '{}' has unrecognised Technology Type '{}'",
                    assay, value
                )),
                None => channel.error(format!("Assay '{}' has no Technology Type", assay)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Comment, ControlledTerm, FullAssay, NodeKind, Publication};
    use crate::status::ChannelOptions;

    fn channel() -> Channel {
        Channel::new(ARCHIVE_MODULE, ChannelOptions::new()).unwrap()
    }

    #[test]
    fn test_idf_required_fields() {
        let mut module = ArchiveChecks::new();
        let mut investigation = Investigation {
            title: Some("T".to_string()),
            publications: vec![
                Publication {
                    title: "unknown 1".to_string(),
                    ..Default::default()
                },
                Publication {
                    title: "Real title".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut channel = channel();

        module.run_idf_checks(&mut investigation, &mut channel);

        // description, factors, one placeholder title
        assert_eq!(channel.errors(), 3);
    }

    #[test]
    fn test_additional_files_from_comments() {
        let mut module = ArchiveChecks::new();
        let mut investigation = Investigation::default();
        investigation
            .comments
            .push(Comment::new(ADDITIONAL_FILE_COMMENT, "extra.txt"));

        module.set_investigation(&investigation);
        let files = module.additional_files(&mut channel());

        assert_eq!(files, vec![DataFileEntry::new("extra.txt", DataFileKind::Additional)]);
    }

    #[test]
    fn test_sdrf_checks() {
        let mut module = ArchiveChecks::new();
        let mut sheet = SimpleSdrf::default();
        sheet.nodes.insert(&NodeKind::Assay, "a1");
        module.add_simple_sdrf(&sheet);

        let mut channel = channel();
        module.run_simple_sdrf_checks(&mut channel);
        assert_eq!(channel.errors(), 1);
    }

    #[test]
    fn test_no_assays() {
        let mut module = ArchiveChecks::new();
        module.add_simple_sdrf(&SimpleSdrf::default());

        let mut channel = channel();
        module.run_simple_sdrf_checks(&mut channel);
        assert_eq!(channel.errors(), 1);
    }

    #[test]
    fn test_full_checks() {
        let mut module = ArchiveChecks::new();
        module.set_full_model(&FullModel {
            assays: vec![
                FullAssay {
                    name: "a1".to_string(),
                    technology_type: Some(ControlledTerm::new("array assay")),
                },
                FullAssay {
                    name: "a2".to_string(),
                    technology_type: Some(ControlledTerm::new("telepathy")),
                },
                FullAssay {
                    name: "a3".to_string(),
                    technology_type: None,
                },
            ],
            ..Default::default()
        });

        let mut channel = channel();
        module.run_full_sdrf_checks(&mut channel);
        assert_eq!(channel.warnings(), 1);
        assert_eq!(channel.errors(), 1);
    }
}
