//! Split command - split a combined document into IDF and SDRF files.

use std::path::{Path, PathBuf};

use colored::Colorize;
use magecheck::input::DocumentSplitter;

pub fn run(
    file: PathBuf,
    idf_out: Option<PathBuf>,
    sdrf_out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let idf_out = idf_out.unwrap_or_else(|| sibling(&file, "idf.txt"));
    let sdrf_out = sdrf_out.unwrap_or_else(|| sibling(&file, "sdrf.txt"));

    let output = DocumentSplitter::new().split(&file, &idf_out, &sdrf_out)?;

    println!("{} {}", "Split".green().bold(), file.display());
    println!("  IDF:  {}", output.idf.display());
    println!("  SDRF: {}", output.sdrf.display());

    Ok(())
}

/// `<dir>/<stem>.<suffix>` next to `file`.
fn sibling(file: &Path, suffix: &str) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}.{}", stem, suffix))
}
