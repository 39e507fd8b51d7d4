use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::analyzer::yamlfix::OutputFormat;

#[derive(Parser)]
#[command(name = "yamlfix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Repair malformed Kubernetes YAML manifests")]
#[command(long_about = "Repairs hand-written or generated Kubernetes-style YAML that may not parse: missing colons, misspelled keys, broken indentation, wrong scalar types and misplaced fields. Every change is recorded with a reason and a confidence score.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (default: ./.yamlfix.toml, then ~/.yamlfix.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Repair YAML files and report every change
    Fix {
        /// Files or directories to fix (`-` reads stdin)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Allow structural moves (e.g. root `name` into `metadata`)
        #[arg(short, long)]
        aggressive: bool,

        /// Spaces per indentation level
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=8))]
        indent_step: Option<u8>,

        /// Changes scored below this confidence are flagged for review
        #[arg(long, value_name = "SCORE")]
        threshold: Option<f64>,

        /// Maximum number of repair passes
        #[arg(long, value_name = "N")]
        max_iterations: Option<usize>,

        /// Write fixed content back to the files (stdin input goes to stdout)
        #[arg(short, long)]
        write: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Report defects without modifying anything
    Validate {
        /// Files or directories to validate (`-` reads stdin)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Spaces per indentation level
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=8))]
        indent_step: Option<u8>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Stylish,
    Json,
    Diff,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Stylish => OutputFormat::Stylish,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Diff => OutputFormat::Diff,
        }
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
