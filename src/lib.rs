//! # Syncable yamlfix
//!
//! Repairs malformed Kubernetes-style YAML manifests. The engine takes text
//! that may not parse and returns a corrected document together with an
//! auditable list of every change and a confidence score for each.
//!
//! ## Features
//!
//! - **Syntax repair**: missing colons, colon and list-marker spacing, tabs, unclosed quotes
//! - **Typo correction**: misspelled keys resolved against a table of known fields
//! - **Indentation reconstruction**: uniform step from a nesting stack, even on unparseable input
//! - **Type coercion**: `replicas: three` becomes `replicas: 3`
//! - **Structural moves**: opt-in relocation of misplaced fields (`aggressive`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use syncable_yamlfix::{FixOptions, fix};
//!
//! let result = fix("apiVersion v1\nkind: Pod\n", &FixOptions::default());
//! assert_eq!(result.fixed, "apiVersion: v1\nkind: Pod\n");
//! assert!(result.is_valid);
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use analyzer::yamlfix::{
    Change, FixOptions, FixResult, ValidateOptions, ValidationError, ValidationReport, fix,
    handle_fix_request, handle_validate_request, validate,
};
pub use error::{Result, YamlfixError};
use cli::Commands;
use config::Config;
use handlers::{FixCommand, ValidateCommand};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a parsed command. Flags override config values, config values
/// override defaults. Returns whether every input ended up valid.
pub fn run_command(command: Commands, config: &Config, quiet: bool) -> Result<bool> {
    let configured_format = config.output_format()?.unwrap_or_default();

    match command {
        Commands::Fix {
            paths,
            aggressive,
            indent_step,
            threshold,
            max_iterations,
            write,
            format,
        } => {
            let mut options = config.fix_options();
            if aggressive {
                options = options.with_aggressive(true);
            }
            if let Some(step) = indent_step {
                options = options.with_indent_step(step as usize);
            }
            if let Some(threshold) = threshold {
                options = options.with_threshold(threshold);
            }
            if let Some(iterations) = max_iterations {
                options = options.with_max_iterations(iterations);
            }

            handlers::handle_fix(
                FixCommand {
                    paths,
                    options,
                    write,
                    format: format.map(Into::into).unwrap_or(configured_format),
                    quiet,
                },
                &config.input,
            )
        }
        Commands::Validate {
            paths,
            indent_step,
            format,
        } => {
            let mut options = config.validate_options();
            if let Some(step) = indent_step {
                options = options.with_indent_step(step as usize);
            }

            handlers::handle_validate(
                ValidateCommand {
                    paths,
                    options,
                    format: format.map(Into::into).unwrap_or(configured_format),
                    quiet,
                },
                &config.input,
            )
        }
    }
}
