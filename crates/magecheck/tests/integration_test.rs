//! End-to-end tests for the validation pipeline.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard};

use tempfile::TempDir;

use magecheck::checks::{CheckModule, CheckModuleRegistry, ATLAS_NOT_PERFORMED_MESSAGE};
use magecheck::model::{DataFileEntry, FullModel, Investigation, ModelBuilder, SimpleSdrf};
use magecheck::pipeline::ACCESSION_COMMENT;
use magecheck::status::{Channel, MemoryReport, Severity};
use magecheck::{
    CheckModuleSpec, FindingType, MagetabError, Stage, TabularModelBuilder, Validator,
    ValidatorConfig, CORE_CHANNEL,
};

/// The full parse changes the process working directory.
static CWD: Mutex<()> = Mutex::new(());

fn lock_cwd() -> MutexGuard<'static, ()> {
    CWD.lock().unwrap_or_else(|e| e.into_inner())
}

// =============================================================================
// Submission fixtures
// =============================================================================

const IDF: &str = "Investigation Title\tHeat shock time course\n\
                   Experiment Description\tYeast cells at 37C\n\
                   Experimental Factor Name\ttime\n\
                   Publication Title\tA heat shock study\n\
                   PubMed ID\t123456\n\
                   SDRF File\tsheet.txt\n";

const SDRF: &str = "Source Name\tAssay Name\tTechnology Type\tArray Design REF\tArray Data File\tDerived Array Data Matrix File\n\
                    s1\ta1\tarray assay\tA-AFFY-1\ta1.CEL\tmatrix.txt\n\
                    s2\ta2\tarray assay\tA-AFFY-1\ta2.CEL\tmatrix.txt\n";

const MATRIX: &str = "Hybridization REF\ta1\ta2\n\
                      Reporter REF\tsignal\tsignal\n\
                      probe_1\t1.0\t2.0\n";

/// A valid submission: IDF, one sample sheet, one matrix and two raw files.
fn submission() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "exp.idf.txt", IDF);
    write(dir.path(), "sheet.txt", SDRF);
    write(dir.path(), "matrix.txt", MATRIX);
    write(dir.path(), "a1.CEL", "raw");
    write(dir.path(), "a2.CEL", "raw");
    let idf = dir.path().join("exp.idf.txt");
    (dir, idf)
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Contents of a combined document built from the fixtures.
fn combined_document(sdrf: &str) -> String {
    let idf: String = IDF
        .lines()
        .filter(|l| !l.starts_with("SDRF File"))
        .map(|l| format!("{}\n", l))
        .collect();
    format!("[IDF]\n{}[SDRF]\n{}", idf, sdrf)
}

fn temp_outputs(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("combined.") && (n.ends_with(".idf.txt") || n.ends_with(".sdrf.txt")))
        .collect()
}

/// Counts invocations and returns a canned result.
struct CountingBuilder {
    calls: Rc<Cell<usize>>,
    fail: bool,
}

impl CountingBuilder {
    fn new(fail: bool) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                calls: calls.clone(),
                fail,
            },
            calls,
        )
    }
}

impl ModelBuilder for CountingBuilder {
    fn build(&mut self, _idf: &Path, investigation: &Investigation) -> magecheck::Result<FullModel> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(MagetabError::FullParse("graph could not be resolved".to_string()));
        }
        Ok(FullModel {
            investigation: investigation.clone(),
            ..Default::default()
        })
    }
}

fn validator(config: ValidatorConfig, builder: Box<dyn ModelBuilder>) -> Validator {
    Validator::new(config, &CheckModuleRegistry::with_builtins(), builder).unwrap()
}

// =============================================================================
// Full runs
// =============================================================================

#[test]
fn test_valid_submission_passes() {
    let _cwd = lock_cwd();
    let (_dir, idf) = submission();
    let before = std::env::current_dir().unwrap();

    let config = ValidatorConfig::idf(&idf)
        .with_check_module(CheckModuleSpec::new("archive"))
        .with_check_module(CheckModuleSpec::new("atlas"));
    let mut validator = validator(config, Box::new(TabularModelBuilder::new()));
    validator.parse().unwrap();

    assert_eq!(validator.status(None).unwrap().len(), 3);
    assert!(!validator.has_errors(None).unwrap(), "{:?}", validator.status(None));
    assert!(!validator.has_warnings(None).unwrap());
    assert_eq!(validator.stage(), Stage::Done);
    assert_eq!(validator.full_model().unwrap().assays.len(), 2);
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
fn test_naive_errors_skip_full_parse() {
    let _cwd = lock_cwd();
    let (dir, idf) = submission();
    write(
        dir.path(),
        "matrix.txt",
        "Hybridization REF\ta1\tassay9\nReporter REF\tsignal\tsignal\n",
    );
    fs::remove_file(dir.path().join("a2.CEL")).unwrap();

    let atlas_report = Arc::new(Mutex::new(MemoryReport::new()));
    let (builder, calls) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(&idf)
        .with_check_module(CheckModuleSpec::new("atlas"))
        .with_atlas_report_sink(atlas_report.clone());
    let mut validator = validator(config, Box::new(builder));
    validator.parse().unwrap();

    assert_eq!(calls.get(), 0);
    assert!(validator.full_model().is_none());

    // The data file check still ran.
    let types: Vec<_> = validator.findings().iter().map(|f| f.finding_type()).collect();
    assert_eq!(types, vec![FindingType::NodeNotFound, FindingType::MissingDataFile]);
    assert_eq!(validator.error_count(Some(CORE_CHANNEL)).unwrap(), 2);

    // The atlas module was told its checks were not performed.
    assert_eq!(validator.error_count(Some("atlas")).unwrap(), 1);
    assert!(atlas_report
        .lock()
        .unwrap()
        .entries()
        .iter()
        .any(|e| e.message.ends_with(ATLAS_NOT_PERFORMED_MESSAGE)));
}

#[test]
fn test_full_parse_failure_still_checks_files() {
    let _cwd = lock_cwd();
    let (dir, idf) = submission();
    fs::remove_file(dir.path().join("a1.CEL")).unwrap();

    let (builder, calls) = CountingBuilder::new(true);
    let mut validator = validator(ValidatorConfig::idf(&idf), Box::new(builder));
    validator.parse().unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(validator.error_count(Some(CORE_CHANNEL)).unwrap(), 2);
    assert_eq!(
        validator.findings()[0].finding_type(),
        FindingType::MissingDataFile
    );
}

#[test]
fn test_unregistered_technology_type() {
    let _cwd = lock_cwd();
    let (_dir, idf) = submission();

    // The assay's term is missing from the registered terms.
    struct Unregistered;
    impl ModelBuilder for Unregistered {
        fn build(&mut self, _idf: &Path, _inv: &Investigation) -> magecheck::Result<FullModel> {
            Ok(FullModel {
                assays: vec![magecheck::model::FullAssay {
                    name: "a1".to_string(),
                    technology_type: Some(magecheck::model::ControlledTerm::new("array assay")),
                }],
                ..Default::default()
            })
        }
    }

    let mut validator = validator(ValidatorConfig::idf(&idf), Box::new(Unregistered));
    validator.parse().unwrap();

    assert_eq!(
        validator.findings()[0].finding_type(),
        FindingType::MissingTechnologyType
    );
}

#[test]
fn test_unparseable_idf_aborts() {
    let _cwd = lock_cwd();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "exp.idf.txt", "");
    let idf = dir.path().join("exp.idf.txt");

    let (builder, calls) = CountingBuilder::new(false);
    let mut validator = validator(ValidatorConfig::idf(&idf), Box::new(builder));
    validator.parse().unwrap();

    assert!(validator.has_errors(Some(CORE_CHANNEL)).unwrap());
    assert!(validator.investigation().is_none());
    assert!(validator.sample_sheets().is_empty());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_no_sample_sheets_warns() {
    let _cwd = lock_cwd();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "exp.idf.txt", "Investigation Title\tNo sheets\n");
    let idf = dir.path().join("exp.idf.txt");

    let (builder, calls) = CountingBuilder::new(false);
    let mut validator = validator(ValidatorConfig::idf(&idf), Box::new(builder));
    validator.parse().unwrap();

    assert!(!validator.has_errors(None).unwrap());
    assert_eq!(validator.warning_count(Some(CORE_CHANNEL)).unwrap(), 1);
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_bad_sample_sheet_does_not_stop_others() {
    let _cwd = lock_cwd();
    let (dir, _) = submission();
    write(
        dir.path(),
        "two.idf.txt",
        "Investigation Title\tTwo sheets\nSDRF File\tmissing.txt\tsheet.txt\n",
    );

    let (builder, calls) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(dir.path().join("two.idf.txt"));
    let mut validator = validator(config, Box::new(builder));
    validator.parse().unwrap();

    assert_eq!(validator.sample_sheets().len(), 1);
    assert_eq!(validator.error_count(Some(CORE_CHANNEL)).unwrap(), 1);
    assert_eq!(calls.get(), 0);
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn test_accession_injected() {
    let _cwd = lock_cwd();
    let (_dir, idf) = submission();

    let (builder, _) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(&idf).with_accession("E-MTAB-42");
    let mut validator = validator(config, Box::new(builder));
    validator.parse().unwrap();

    let investigation = validator.investigation().unwrap();
    assert_eq!(investigation.comment(ACCESSION_COMMENT), Some("E-MTAB-42"));

    // Not written back.
    assert!(!fs::read_to_string(&idf).unwrap().contains("E-MTAB-42"));
}

#[test]
fn test_skip_data_checks() {
    let _cwd = lock_cwd();
    let (dir, idf) = submission();
    fs::remove_file(dir.path().join("matrix.txt")).unwrap();
    fs::remove_file(dir.path().join("a1.CEL")).unwrap();

    let (builder, calls) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(&idf).with_skip_data_checks(true);
    let mut validator = validator(config, Box::new(builder));
    validator.parse().unwrap();

    assert!(!validator.has_errors(None).unwrap());
    assert_eq!(validator.warning_count(None).unwrap(), 1);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_skip_data_checks_without_sample_sheets() {
    let _cwd = lock_cwd();
    let (dir, _) = submission();
    let idf_text: String = IDF
        .lines()
        .filter(|l| !l.starts_with("SDRF File"))
        .map(|l| format!("{}\n", l))
        .collect();
    write(
        dir.path(),
        "exp.idf.txt",
        &format!("{}Comment[AdditionalFile:Data]\tmissing_extra.txt\n", idf_text),
    );

    let (builder, calls) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(dir.path().join("exp.idf.txt"))
        .with_check_module(CheckModuleSpec::new("archive"))
        .with_skip_data_checks(true);
    let mut validator = validator(config, Box::new(builder));
    validator.parse().unwrap();

    // One warning for the missing SDRF, one for the skipped data checks.
    assert_eq!(validator.warning_count(Some(CORE_CHANNEL)).unwrap(), 2);
    assert!(!validator.has_errors(None).unwrap());
    assert!(validator.findings().is_empty());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_sequencing_skips_raw_files() {
    let _cwd = lock_cwd();
    let (dir, idf) = submission();
    write(
        dir.path(),
        "sheet.txt",
        "Source Name\tAssay Name\tTechnology Type\tArray Data File\n\
         s1\ta1\tsequencing assay\trun1.fastq.gz\n",
    );

    let (builder, _) = CountingBuilder::new(false);
    let mut validator = validator(ValidatorConfig::idf(&idf), Box::new(builder));
    validator.parse().unwrap();

    assert!(!validator.has_errors(None).unwrap());
    assert_eq!(validator.warning_count(Some(CORE_CHANNEL)).unwrap(), 1);
}

#[test]
fn test_status_sum_and_reset() {
    let _cwd = lock_cwd();
    let (dir, idf) = submission();
    write(dir.path(), "exp.idf.txt", "SDRF File\tsheet.txt\n");
    fs::remove_file(dir.path().join("a1.CEL")).unwrap();

    let (builder, _) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(&idf)
        .with_check_module(CheckModuleSpec::new("archive"))
        .with_check_module(CheckModuleSpec::new("atlas"));
    let mut validator = validator(config, Box::new(builder));
    validator.parse().unwrap();

    let per_channel: usize = [CORE_CHANNEL, "archive", "atlas"]
        .iter()
        .map(|c| validator.error_count(Some(c)).unwrap())
        .sum();
    assert!(per_channel > 0);
    assert_eq!(validator.error_count(None).unwrap(), per_channel);

    validator.reset_status(None).unwrap();
    assert!(!validator.has_errors(None).unwrap());
    assert!(!validator.has_warnings(None).unwrap());
    assert!(matches!(
        validator.reset_status(Some("curator")),
        Err(MagetabError::ChannelNotFound(_))
    ));
}

#[test]
fn test_report_and_log_file() {
    let _cwd = lock_cwd();
    let (dir, idf) = submission();
    fs::remove_file(dir.path().join("a2.CEL")).unwrap();

    let report = Arc::new(Mutex::new(MemoryReport::new()));
    let atlas_report = Arc::new(Mutex::new(MemoryReport::new()));
    let prefix = dir.path().join("core").to_string_lossy().into_owned();

    let (builder, _) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(&idf)
        .with_log_prefix(prefix)
        .with_check_module(CheckModuleSpec::new("atlas"))
        .with_report_sink(report.clone())
        .with_atlas_report_sink(atlas_report.clone());
    let mut validator = validator(config, Box::new(builder));
    validator.parse().unwrap();
    drop(validator);

    let report = report.lock().unwrap();
    assert!(report.sections().iter().any(|s| s == "Array designs"));
    assert!(report
        .section_entries("Array designs")
        .any(|e| e.severity == Severity::Report && e.message.starts_with("A-AFFY-1:")));
    assert!(report
        .section_entries("Data files")
        .any(|e| e.severity == Severity::Error));

    assert!(!report
        .entries()
        .iter()
        .any(|e| e.message.starts_with("Atlas fail code")));

    // No assays in the full model, so the atlas checks fail on their own sink.
    let atlas_report = atlas_report.lock().unwrap();
    assert!(atlas_report
        .entries()
        .iter()
        .any(|e| e.message.starts_with("Atlas fail code 4")));

    let log = fs::read_to_string(dir.path().join("core_exp.idf.txt.log")).unwrap();
    assert!(log.contains("ERROR: Data file 'a2.CEL' not found"));
}

// =============================================================================
// Combined documents and cleanup
// =============================================================================

#[test]
fn test_combined_document_cleanup_on_success() {
    let _cwd = lock_cwd();
    let (dir, _) = submission();
    write(dir.path(), "combined.txt", &combined_document(SDRF));

    let mut validator = validator(
        ValidatorConfig::combined(dir.path().join("combined.txt")),
        Box::new(TabularModelBuilder::new()),
    );
    validator.parse().unwrap();

    assert!(!validator.has_errors(None).unwrap(), "{:?}", validator.status(None));
    assert_eq!(temp_outputs(dir.path()).len(), 2);

    drop(validator);
    assert!(temp_outputs(dir.path()).is_empty());
}

#[test]
fn test_combined_document_cleanup_on_naive_failure() {
    let _cwd = lock_cwd();
    let (dir, _) = submission();
    let broken = SDRF.replace("a2\tarray", "a3\tarray");
    write(dir.path(), "combined.txt", &combined_document(&broken));

    let (builder, calls) = CountingBuilder::new(false);
    let mut validator = validator(
        ValidatorConfig::combined(dir.path().join("combined.txt")),
        Box::new(builder),
    );
    validator.parse().unwrap();
    assert!(validator.has_errors(None).unwrap());
    assert_eq!(calls.get(), 0);

    drop(validator);
    assert!(temp_outputs(dir.path()).is_empty());
}

#[test]
fn test_combined_document_cleanup_on_full_parse_failure() {
    let _cwd = lock_cwd();
    let (dir, _) = submission();
    write(dir.path(), "combined.txt", &combined_document(SDRF));

    let (builder, calls) = CountingBuilder::new(true);
    let mut validator = validator(
        ValidatorConfig::combined(dir.path().join("combined.txt")),
        Box::new(builder),
    );
    validator.parse().unwrap();
    assert_eq!(calls.get(), 1);

    drop(validator);
    assert!(temp_outputs(dir.path()).is_empty());
}

#[test]
fn test_combined_document_without_idf_marker() {
    let _cwd = lock_cwd();
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "combined.txt", "Investigation Title\tT\n[SDRF]\nSource Name\n");

    let (builder, _) = CountingBuilder::new(false);
    let mut validator = validator(
        ValidatorConfig::combined(dir.path().join("combined.txt")),
        Box::new(builder),
    );

    assert!(matches!(
        validator.parse(),
        Err(MagetabError::SplitFormat { .. })
    ));
    assert!(temp_outputs(dir.path()).is_empty());
    assert!(matches!(validator.parse(), Err(MagetabError::Config(_))));
}

// =============================================================================
// Check modules
// =============================================================================

struct Recorder {
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl CheckModule for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn set_investigation(&mut self, _investigation: &Investigation) {
        self.calls.borrow_mut().push("set_investigation");
    }

    fn run_idf_checks(&mut self, _investigation: &mut Investigation, _channel: &mut Channel) {
        self.calls.borrow_mut().push("run_idf_checks");
    }

    fn additional_files(&mut self, _channel: &mut Channel) -> Vec<DataFileEntry> {
        self.calls.borrow_mut().push("additional_files");
        Vec::new()
    }

    fn add_simple_sdrf(&mut self, _sdrf: &SimpleSdrf) {
        self.calls.borrow_mut().push("add_simple_sdrf");
    }

    fn run_simple_sdrf_checks(&mut self, _channel: &mut Channel) {
        self.calls.borrow_mut().push("run_simple_sdrf_checks");
    }

    fn set_full_model(&mut self, _model: &FullModel) {
        self.calls.borrow_mut().push("set_full_model");
    }

    fn run_full_sdrf_checks(&mut self, channel: &mut Channel) {
        self.calls.borrow_mut().push("run_full_sdrf_checks");
        channel.warn("recorded");
    }

    fn record_checks_not_performed(&mut self, _channel: &mut Channel) {
        self.calls.borrow_mut().push("record_checks_not_performed");
    }
}

fn recorder_registry() -> (CheckModuleRegistry, Rc<RefCell<Vec<&'static str>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut registry = CheckModuleRegistry::with_builtins();
    let shared = calls.clone();
    registry.register("recorder", move || {
        Box::new(Recorder {
            calls: shared.clone(),
        })
    });
    (registry, calls)
}

#[test]
fn test_hook_order() {
    let _cwd = lock_cwd();
    let (_dir, idf) = submission();
    let (registry, calls) = recorder_registry();

    let (builder, _) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(&idf).with_check_module(CheckModuleSpec::new("recorder"));
    let mut validator = Validator::new(config, &registry, Box::new(builder)).unwrap();
    validator.parse().unwrap();

    assert_eq!(
        *calls.borrow(),
        vec![
            "set_investigation",
            "run_idf_checks",
            "additional_files",
            "add_simple_sdrf",
            "run_simple_sdrf_checks",
            "set_full_model",
            "run_full_sdrf_checks",
        ]
    );
    assert!(validator.has_warnings(Some("recorder")).unwrap());
    assert!(!validator.has_warnings(Some(CORE_CHANNEL)).unwrap());
}

#[test]
fn test_hook_order_after_naive_failure() {
    let _cwd = lock_cwd();
    let (dir, idf) = submission();
    fs::remove_file(dir.path().join("matrix.txt")).unwrap();
    let (registry, calls) = recorder_registry();

    let (builder, _) = CountingBuilder::new(false);
    let config = ValidatorConfig::idf(&idf).with_check_module(CheckModuleSpec::new("recorder"));
    let mut validator = Validator::new(config, &registry, Box::new(builder)).unwrap();
    validator.parse().unwrap();

    assert_eq!(calls.borrow().last(), Some(&"record_checks_not_performed"));
    assert!(!calls.borrow().contains(&"set_full_model"));
}

#[test]
fn test_unknown_module_rejected() {
    let (registry, _) = recorder_registry();
    let config = ValidatorConfig::idf("/nonexistent/exp.idf.txt")
        .with_check_module(CheckModuleSpec::new("curator"));

    let (builder, _) = CountingBuilder::new(false);
    assert!(matches!(
        Validator::new(config, &registry, Box::new(builder)),
        Err(MagetabError::UnknownCheckModule(name)) if name == "curator"
    ));
}
