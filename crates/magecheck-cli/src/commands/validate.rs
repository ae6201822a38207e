//! Validate command - run the pipeline over one submission.

use colored::Colorize;
use magecheck::status::SharedReportSink;
use magecheck::{
    CheckModuleRegistry, ChannelStatus, TabularModelBuilder, TextReport, Validator,
    ValidatorConfig,
};

use crate::cli::ValidateArgs;

/// Returns `Ok(false)` when any channel recorded errors.
pub fn run(args: ValidateArgs, verbose: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = ValidatorConfig {
        idf: args.idf,
        combined: args.combined,
        data_dir: args.data_dir,
        accession: args.accession,
        log_prefix: args.log_prefix,
        check_modules: args.checks,
        skip_data_checks: args.skip_data_checks,
        verbose,
        ..Default::default()
    };

    if let Some(ref path) = args.report {
        config.report_sink = Some(open_report(path)?);
    }
    if let Some(ref path) = args.atlas_report {
        config.atlas_report_sink = Some(open_report(path)?);
    }

    let registry = CheckModuleRegistry::with_builtins();
    let mut validator = Validator::new(config, &registry, Box::new(TabularModelBuilder::new()))?;
    let input = validator
        .config()
        .input()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    log::debug!("{:?}", validator.config());
    validator.parse()?;

    let status = validator.status(None)?;
    let has_errors = validator.has_errors(None)?;

    if args.json {
        let output = serde_json::json!({
            "input": input,
            "stage": validator.stage(),
            "channels": status,
            "findings": validator.findings(),
            "passed": !has_errors,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} {}", "Validation status for".cyan().bold(), input.white());
        println!();
        for channel in &status {
            print_channel(channel);
        }
        println!();
        if has_errors {
            println!("{}", "FAILED".red().bold());
        } else {
            println!("{}", "PASSED".green().bold());
        }
    }

    Ok(!has_errors)
}

fn open_report(path: &std::path::Path) -> Result<SharedReportSink, Box<dyn std::error::Error>> {
    Ok(TextReport::create(path)?.shared())
}

fn print_channel(status: &ChannelStatus) {
    let errors = if status.errors > 0 {
        status.errors.to_string().red()
    } else {
        status.errors.to_string().green()
    };
    let warnings = if status.warnings > 0 {
        status.warnings.to_string().yellow()
    } else {
        status.warnings.to_string().green()
    };

    println!(
        "  {} errors: {}  warnings: {}",
        format!("{:<12}", status.channel).white().bold(),
        errors,
        warnings
    );
}
