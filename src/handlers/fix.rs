use std::path::PathBuf;

use rayon::prelude::*;

use crate::analyzer::yamlfix::{
    FixOptions, FixResult, OutputFormat, fix_with_path, format_fix_results,
};
use crate::config::types::InputConfig;
use crate::error::Result;

use super::input::{self, Source};

/// Everything `yamlfix fix` needs once flags and config are merged.
#[derive(Debug, Clone)]
pub struct FixCommand {
    pub paths: Vec<PathBuf>,
    pub options: FixOptions,
    pub write: bool,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Fix every input. Returns whether all results are valid.
pub fn handle_fix(command: FixCommand, input_config: &InputConfig) -> Result<bool> {
    let sources = input::collect_sources(&command.paths, input_config)?;
    if sources.is_empty() {
        log::warn!("No YAML files found");
        return Ok(true);
    }

    let inputs = sources
        .par_iter()
        .map(input::read_source)
        .collect::<Result<Vec<_>>>()?;

    let results: Vec<FixResult> = inputs
        .par_iter()
        .map(|input| fix_with_path(&input.content, &input.label(), &command.options))
        .collect();

    let mut fixed_to_stdout = false;
    if command.write {
        for (input, result) in inputs.iter().zip(&results) {
            match &input.source {
                Source::Stdin => {
                    print!("{}", result.fixed);
                    fixed_to_stdout = true;
                }
                Source::File(path) if result.is_modified() => {
                    input::write_back(path, &result.fixed)?;
                    log::info!("Wrote {}", path.display());
                }
                Source::File(_) => {}
            }
        }
    }

    if !command.quiet {
        let report = format_fix_results(&results, command.format);
        if !report.is_empty() {
            if fixed_to_stdout {
                eprint!("{}", report);
            } else {
                print!("{}", report);
                if command.format == OutputFormat::Json {
                    println!();
                }
            }
        }
    }

    let valid = results.iter().all(|r| r.is_valid);
    log::info!(
        "Fixed {} files: {} changes, all valid: {}",
        results.len(),
        results.iter().map(|r| r.changes.len()).sum::<usize>(),
        valid
    );
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn command(paths: Vec<PathBuf>, write: bool) -> FixCommand {
        FixCommand {
            paths,
            options: FixOptions::default(),
            write,
            format: OutputFormat::Json,
            quiet: true,
        }
    }

    #[test]
    fn test_write_rewrites_modified_files() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("broken.yaml");
        let clean = dir.path().join("clean.yaml");
        fs::write(&broken, "apiVersion v1\nkind: Pod\n").unwrap();
        fs::write(&clean, "kind: Pod\n").unwrap();

        let command = command(vec![dir.path().to_path_buf()], true);
        let valid = handle_fix(command, &InputConfig::default()).unwrap();
        assert!(valid);
        assert_eq!(fs::read_to_string(&broken).unwrap(), "apiVersion: v1\nkind: Pod\n");
        assert_eq!(fs::read_to_string(&clean).unwrap(), "kind: Pod\n");
    }

    #[test]
    fn test_without_write_files_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "apiVersion v1\n").unwrap();

        handle_fix(command(vec![path.clone()], false), &InputConfig::default()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "apiVersion v1\n");
    }

    #[test]
    fn test_invalid_result_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "kind: Pod\nfrobnicate\n").unwrap();

        let valid = handle_fix(command(vec![path], false), &InputConfig::default()).unwrap();
        assert!(!valid);
    }
}
