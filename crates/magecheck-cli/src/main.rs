//! magecheck CLI - staged MAGE-TAB validation.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Validate(args) => commands::validate::run(args, cli.verbose),

        Commands::Split {
            file,
            idf_out,
            sdrf_out,
        } => commands::split::run(file, idf_out, sdrf_out).map(|_| true),

        Commands::Modules => commands::modules::run().map(|_| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
