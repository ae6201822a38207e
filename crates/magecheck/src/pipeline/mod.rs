//! The staged validation pipeline.
//!
//! ```text
//! [split] -> naive IDF -> IDF checks -> naive SDRF -> naive matrices
//!         -> decision -> { skip | full parse -> post-parse checks }
//!         -> data file checks
//! ```
//!
//! Problems in the submission are recorded on status channels. The outcome
//! of a run is read back with [`Validator::has_errors`] and friends.

mod config;
mod state;
mod workdir;

pub use config::{CheckModuleSpec, ValidatorConfig};
pub use state::{PipelineState, Stage};
pub use workdir::WorkingDirGuard;

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::checks::{ATLAS_MODULE, CheckModule, CheckModuleRegistry};
use crate::error::{MagetabError, Result};
use crate::input::{DocumentSplitter, IdfReader, MatrixReader, SdrfReader};
use crate::model::{
    DataFileEntry, DataFileKind, FullModel, Investigation, ModelBuilder, NodeSets, SimpleSdrf,
};
use crate::status::{Channel, ChannelOptions, ChannelRegistry, ChannelStatus, CORE_CHANNEL};
use crate::validation::{check_technology_types, ConsistencyValidator, DataFileChecker, Finding};

/// Comment the accession is injected as.
pub const ACCESSION_COMMENT: &str = "ArrayExpressAccession";
/// IDF comment declaring the experiment type.
pub const EXPERIMENT_TYPE_COMMENT: &str = "AEExperimentType";

/// Validates one MAGE-TAB submission.
pub struct Validator {
    config: ValidatorConfig,
    channels: ChannelRegistry,
    modules: Vec<Box<dyn CheckModule>>,
    builder: Box<dyn ModelBuilder>,
    idf_reader: IdfReader,
    state: PipelineState,
    investigation: Option<Investigation>,
    sample_sheets: Vec<SimpleSdrf>,
    findings: Vec<Finding>,
    full_model: Option<FullModel>,
}

impl Validator {
    /// Create a validator.
    ///
    /// The configuration and the requested check modules are validated before
    /// any file is touched.
    pub fn new(
        config: ValidatorConfig,
        registry: &CheckModuleRegistry,
        builder: Box<dyn ModelBuilder>,
    ) -> Result<Self> {
        config.validate(registry)?;

        let modules = config
            .check_modules
            .iter()
            .map(|spec| registry.create(&spec.name))
            .collect::<Result<Vec<_>>>()?;

        let mut channels = ChannelRegistry::new();
        let mut core = ChannelOptions::new()
            .with_verbose(config.verbose)
            .with_report_sink(config.report_sink.clone());
        if let Some(ref prefix) = config.log_prefix {
            core = core.with_log_file(config.log_file(prefix));
        }
        channels.get_or_create(CORE_CHANNEL, core)?;

        for spec in &config.check_modules {
            let sink = if spec.name == ATLAS_MODULE {
                config
                    .atlas_report_sink
                    .clone()
                    .or_else(|| config.report_sink.clone())
            } else {
                config.report_sink.clone()
            };
            let mut options = ChannelOptions::new()
                .with_verbose(config.verbose)
                .with_report_sink(sink);
            if let Some(ref prefix) = spec.log_prefix {
                options = options.with_log_file(config.log_file(prefix));
            }
            channels.get_or_create(&spec.name, options)?;
        }

        let state = PipelineState::new(config.resolved_data_dir(), config.skip_data_checks);

        Ok(Self {
            config,
            channels,
            modules,
            builder,
            idf_reader: IdfReader::new(),
            state,
            investigation: None,
            sample_sheets: Vec::new(),
            findings: Vec::new(),
            full_model: None,
        })
    }

    /// Replace the IDF reader, e.g. to inject a publication builder.
    pub fn with_idf_reader(mut self, reader: IdfReader) -> Self {
        self.idf_reader = reader;
        self
    }

    /// Run the pipeline.
    ///
    /// Only fatal conditions are returned as errors: a combined document that
    /// cannot be split, or a second call. Everything else, including an IDF
    /// that cannot be parsed, is recorded on the status channels.
    pub fn parse(&mut self) -> Result<()> {
        if self.state.stage() != Stage::Init {
            return Err(MagetabError::Config(
                "a validator can only be run once".to_string(),
            ));
        }

        let data_dir = absolute(self.state.data_dir())?;
        self.state.set_data_dir(&data_dir);

        let idf = match self.prepare_idf() {
            Ok(idf) => idf,
            Err(e) => {
                self.core()?.error(e.to_string());
                self.state.advance(Stage::Done);
                return Err(e);
            }
        };

        self.state.advance(Stage::NaiveIdf);
        let core = self.core()?;
        core.open_section("IDF");
        core.info(format!("Reading IDF {}", idf.display()));
        let mut investigation = match self.idf_reader.read(&idf) {
            Ok(investigation) => investigation,
            Err(e) => {
                self.core()?.error(format!("IDF could not be parsed: {}", e));
                self.state.advance(Stage::Done);
                return Ok(());
            }
        };

        if let Some(accession) = self.config.accession.clone() {
            investigation.set_comment(ACCESSION_COMMENT, accession.as_str());
            self.core()?
                .debug(format!("Injected {} = {}", ACCESSION_COMMENT, accession));
        }

        self.state.advance(Stage::IdfChecks);
        let additional = self.run_idf_checks(&mut investigation)?;

        if investigation.sample_sheets.is_empty() {
            self.core()?.warn(
                "No SDRF File found in IDF; skipping SDRF, data matrix and full parse checks",
            );
        } else {
            self.read_sample_sheets(&investigation)?;
            self.read_data_matrices()?;
            self.decide(&idf, &investigation)?;
        }

        self.check_data_files(&investigation, &additional)?;

        self.investigation = Some(investigation);
        self.state.advance(Stage::Done);
        Ok(())
    }

    fn core(&mut self) -> Result<&mut Channel> {
        self.channels.get_mut(CORE_CHANNEL)
    }

    /// Call `hook` for each module with the module's own channel.
    fn each_module(
        &mut self,
        mut hook: impl FnMut(&mut dyn CheckModule, &mut Channel),
    ) -> Result<()> {
        for module in self.modules.iter_mut() {
            let channel = self.channels.get_mut(module.name())?;
            hook(module.as_mut(), channel);
        }
        Ok(())
    }

    /// Resolve the IDF to read, splitting a combined document first.
    fn prepare_idf(&mut self) -> Result<PathBuf> {
        if let Some(ref idf) = self.config.idf {
            return absolute(idf);
        }

        let combined = self
            .config
            .combined
            .clone()
            .ok_or_else(|| MagetabError::Config("no input given".to_string()))?;

        self.state.advance(Stage::Split);
        let (idf_out, sdrf_out) = DocumentSplitter::temp_paths(&combined, self.state.data_dir());
        self.state.track_temp_file(&idf_out);
        self.state.track_temp_file(&sdrf_out);

        let output = DocumentSplitter::new().split(&combined, &idf_out, &sdrf_out)?;
        self.core()?.debug(format!(
            "Split {} into {} and {}",
            combined.display(),
            output.idf.display(),
            output.sdrf.display()
        ));
        Ok(output.idf)
    }

    fn run_idf_checks(&mut self, investigation: &mut Investigation) -> Result<Vec<DataFileEntry>> {
        let mut additional = Vec::new();
        self.each_module(|module, channel| {
            module.set_investigation(investigation);
            module.run_idf_checks(investigation, channel);
            additional.extend(module.additional_files(channel));
        })?;
        Ok(additional)
    }

    fn read_sample_sheets(&mut self, investigation: &Investigation) -> Result<()> {
        self.state.advance(Stage::NaiveSdrf);
        self.core()?.open_section("SDRF");

        let reader = SdrfReader::new();
        for reference in &investigation.sample_sheets {
            let path = resolve(self.state.data_dir(), &reference.path);
            self.core()?.info(format!("Reading SDRF {}", path.display()));

            match reader.read(&path) {
                Ok(sheet) => {
                    self.each_module(|module, _| module.add_simple_sdrf(&sheet))?;
                    self.sample_sheets.push(sheet);
                }
                Err(e) => self.core()?.error(format!("SDRF could not be parsed: {}", e)),
            }
        }

        if !self.sample_sheets.is_empty() {
            self.each_module(|module, channel| module.run_simple_sdrf_checks(channel))?;
        }

        let core = self.channels.get_mut(CORE_CHANNEL)?;
        core.open_section("Array designs");
        for sheet in &self.sample_sheets {
            for (design, files) in &sheet.array_designs {
                let files: Vec<&str> = files.iter().map(|f| f.as_str()).collect();
                core.report(format!("{}: {}", design, files.join(", ")));
            }
        }
        Ok(())
    }

    fn read_data_matrices(&mut self) -> Result<()> {
        self.state.advance(Stage::NaiveMatrix);
        if self.state.skip_data_checks() {
            self.core()?.debug("Data checks skipped: data matrices not parsed");
            return Ok(());
        }

        let mut nodes = NodeSets::new();
        let mut matrices = IndexSet::new();
        for sheet in &self.sample_sheets {
            nodes.extend(&sheet.nodes);
            for file in sheet.files_of_kind(DataFileKind::Transformed) {
                if !file.name.trim().is_empty() {
                    matrices.insert(file.name.clone());
                }
            }
        }

        self.core()?.open_section("Data matrices");
        let reader = MatrixReader::new();
        let validator = ConsistencyValidator::new(&nodes);
        let core = self.channels.get_mut(CORE_CHANNEL)?;
        for name in &matrices {
            if name.contains("://") {
                core.debug(format!("Not parsing remote data matrix {}", name));
                continue;
            }

            let path = resolve(self.state.data_dir(), Path::new(name));
            core.info(format!("Reading data matrix {}", path.display()));
            match reader.read(&path) {
                Ok(matrix) => {
                    for finding in validator.validate(&matrix) {
                        core.error(finding.to_string());
                        self.findings.push(finding);
                    }
                }
                Err(e) => core.error(format!("Data matrix could not be parsed: {}", e)),
            }
        }
        Ok(())
    }

    /// Run the full parse only when the naive stages left the core channel clean.
    fn decide(&mut self, idf: &Path, investigation: &Investigation) -> Result<()> {
        self.state.advance(Stage::Decision);

        let errors = self.core()?.errors();
        if errors > 0 {
            self.core()?.warn(format!(
                "Full MAGE-TAB parse not attempted: {} error(s) in naive checks",
                errors
            ));
            return self.each_module(|module, channel| module.record_checks_not_performed(channel));
        }

        self.state.advance(Stage::FullParse);
        self.core()?.open_section("Full parse");
        let result = match WorkingDirGuard::enter(self.state.data_dir()) {
            Ok(_guard) => self.builder.build(idf, investigation),
            Err(e) => Err(e),
        };

        let model = match result {
            Ok(model) => model,
            Err(e) => {
                self.core()?.error(e.to_string());
                return Ok(());
            }
        };

        self.state.advance(Stage::PostParseChecks);
        let core = self.channels.get_mut(CORE_CHANNEL)?;
        for finding in check_technology_types(&model) {
            core.error(finding.to_string());
            self.findings.push(finding);
        }

        self.state.advance(Stage::FullSdrfChecks);
        self.each_module(|module, channel| {
            module.set_full_model(&model);
            module.run_full_sdrf_checks(channel);
        })?;

        self.full_model = Some(model);
        Ok(())
    }

    fn check_data_files(
        &mut self,
        investigation: &Investigation,
        additional: &[DataFileEntry],
    ) -> Result<()> {
        self.state.advance(Stage::FileExistence);
        if self.state.skip_data_checks() {
            self.core()?
                .warn("Data checks skipped: data matrices not parsed, data files not checked");
            return Ok(());
        }

        let sequencing = is_sequencing(investigation, &self.sample_sheets);
        let checker = DataFileChecker::new(self.state.data_dir()).with_skip_raw(sequencing);
        let files = self
            .sample_sheets
            .iter()
            .flat_map(|sheet| sheet.data_files.iter())
            .chain(additional.iter());
        let report = checker.check(files);

        let core = self.channels.get_mut(CORE_CHANNEL)?;
        core.open_section("Data files");
        if sequencing {
            core.warn(format!(
                "Sequencing submission: {} raw data file(s) not checked",
                report.skipped_raw.len()
            ));
        }
        for finding in report.findings {
            core.error(finding.to_string());
            self.findings.push(finding);
        }
        core.report(format!("{} data file(s) checked", report.checked.len()));
        Ok(())
    }

    pub fn has_errors(&self, channel: Option<&str>) -> Result<bool> {
        self.channels.has_errors(channel)
    }

    pub fn has_warnings(&self, channel: Option<&str>) -> Result<bool> {
        self.channels.has_warnings(channel)
    }

    pub fn error_count(&self, channel: Option<&str>) -> Result<usize> {
        self.channels.error_count(channel)
    }

    pub fn warning_count(&self, channel: Option<&str>) -> Result<usize> {
        self.channels.warning_count(channel)
    }

    pub fn status(&self, channel: Option<&str>) -> Result<Vec<ChannelStatus>> {
        self.channels.status(channel)
    }

    pub fn print_status(&self, channel: Option<&str>) -> Result<()> {
        self.channels.print_status(channel)
    }

    pub fn reset_status(&mut self, channel: Option<&str>) -> Result<()> {
        self.channels.reset(channel)
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// Investigation as read (and amended by check modules), once parsed.
    pub fn investigation(&self) -> Option<&Investigation> {
        self.investigation.as_ref()
    }

    pub fn sample_sheets(&self) -> &[SimpleSdrf] {
        &self.sample_sheets
    }

    /// Findings recorded by the core checks.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn full_model(&self) -> Option<&FullModel> {
        self.full_model.as_ref()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modules: Vec<&str> = self.modules.iter().map(|m| m.name()).collect();
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("modules", &modules)
            .field("state", &self.state)
            .finish()
    }
}

/// Whether the submission is a sequencing experiment.
pub fn is_sequencing(investigation: &Investigation, sheets: &[SimpleSdrf]) -> bool {
    let mentions = |value: &str| value.to_lowercase().contains("sequencing");

    investigation
        .comments_named(EXPERIMENT_TYPE_COMMENT)
        .any(mentions)
        || sheets
            .iter()
            .flat_map(|s| s.technology_types.iter())
            .any(|t| mentions(t))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| MagetabError::io(path, e))
}

fn resolve(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}
