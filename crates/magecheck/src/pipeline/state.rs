//! Orchestrator state: current stage and the temp files it must clean up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Split,
    NaiveIdf,
    IdfChecks,
    NaiveSdrf,
    NaiveMatrix,
    Decision,
    FullParse,
    PostParseChecks,
    FullSdrfChecks,
    FileExistence,
    Done,
}

impl Stage {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Split => "split",
            Stage::NaiveIdf => "naive IDF parse",
            Stage::IdfChecks => "IDF checks",
            Stage::NaiveSdrf => "naive SDRF parse",
            Stage::NaiveMatrix => "naive data matrix parse",
            Stage::Decision => "decision",
            Stage::FullParse => "full parse",
            Stage::PostParseChecks => "post-parse checks",
            Stage::FullSdrfChecks => "full SDRF checks",
            Stage::FileExistence => "data file checks",
            Stage::Done => "done",
        }
    }
}

/// State owned by one pipeline run.
///
/// Temp files registered here are removed when the state is dropped.
#[derive(Debug)]
pub struct PipelineState {
    stage: Stage,
    temp_files: Vec<PathBuf>,
    data_dir: PathBuf,
    skip_data_checks: bool,
}

impl PipelineState {
    pub fn new(data_dir: impl Into<PathBuf>, skip_data_checks: bool) -> Self {
        Self {
            stage: Stage::Init,
            temp_files: Vec::new(),
            data_dir: data_dir.into(),
            skip_data_checks,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn advance(&mut self, stage: Stage) {
        log::debug!("Pipeline stage: {} -> {}", self.stage.label(), stage.label());
        self.stage = stage;
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn set_data_dir(&mut self, dir: impl Into<PathBuf>) {
        self.data_dir = dir.into();
    }

    pub fn skip_data_checks(&self) -> bool {
        self.skip_data_checks
    }

    pub fn temp_files(&self) -> &[PathBuf] {
        &self.temp_files
    }

    /// Register a file for removal on teardown.
    pub fn track_temp_file(&mut self, path: impl Into<PathBuf>) {
        self.temp_files.push(path.into());
    }

    /// Remove every registered temp file that still exists.
    pub fn cleanup(&mut self) {
        for path in self.temp_files.drain(..) {
            if !path.exists() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => log::debug!("Removed temp file {}", path.display()),
                Err(e) => log::warn!("Could not remove temp file {}: {}", path.display(), e),
            }
        }
    }
}

impl Drop for PipelineState {
    fn drop(&mut self) {
        self.cleanup();
    }
}
