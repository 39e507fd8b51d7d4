use clap::Parser;
use std::process;
use syncable_yamlfix::{cli::Cli, config, run_command};

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

fn run() -> syncable_yamlfix::Result<bool> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration
    let cwd = std::env::current_dir()?;
    let config = config::load_config(cli.config.as_deref(), Some(&cwd))?;

    run_command(cli.command, &config, cli.quiet)
}
