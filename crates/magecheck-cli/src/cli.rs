//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use magecheck::CheckModuleSpec;
use std::path::PathBuf;

/// magecheck: staged validation of MAGE-TAB submissions
#[derive(Parser)]
#[command(name = "magecheck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug-level channel messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a submission
    Validate(ValidateArgs),

    /// Split a combined IDF+SDRF document into two files
    Split {
        /// Path to the combined document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the IDF (default: <stem>.idf.txt next to FILE)
        #[arg(long)]
        idf_out: Option<PathBuf>,

        /// Output path for the SDRF (default: <stem>.sdrf.txt next to FILE)
        #[arg(long)]
        sdrf_out: Option<PathBuf>,
    },

    /// List the available check modules
    Modules,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// IDF file to validate
    #[arg(long, value_name = "FILE", required_unless_present = "combined")]
    pub idf: Option<PathBuf>,

    /// Combined IDF+SDRF document to validate
    #[arg(long, value_name = "FILE", conflicts_with = "idf")]
    pub combined: Option<PathBuf>,

    /// Directory holding the SDRFs and data files (default: the input's directory)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Accession to inject as Comment[ArrayExpressAccession]
    #[arg(short, long)]
    pub accession: Option<String>,

    /// Check module to run, optionally with a log file prefix (NAME or NAME=PREFIX)
    #[arg(short, long = "check", value_name = "NAME[=PREFIX]")]
    pub checks: Vec<CheckModuleSpec>,

    /// Write core channel messages to <PREFIX>_<input>.log
    #[arg(long, value_name = "PREFIX")]
    pub log_prefix: Option<String>,

    /// Skip data matrix parsing and data file checks
    #[arg(long)]
    pub skip_data_checks: bool,

    /// Write a sectioned text report to FILE
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Write a separate report for the atlas module to FILE
    #[arg(long, value_name = "FILE")]
    pub atlas_report: Option<PathBuf>,

    /// Output status as JSON
    #[arg(long)]
    pub json: bool,
}
