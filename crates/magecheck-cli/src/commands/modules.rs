//! Modules command - list the registered check modules.

use colored::Colorize;
use magecheck::CheckModuleRegistry;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = CheckModuleRegistry::with_builtins();

    println!("{}", "Check modules:".yellow().bold());
    for name in registry.names() {
        println!("  {}", name.cyan());
    }

    Ok(())
}
