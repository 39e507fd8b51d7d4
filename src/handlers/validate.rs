use std::path::PathBuf;

use rayon::prelude::*;

use crate::analyzer::yamlfix::{
    OutputFormat, ValidateOptions, ValidationReport, format_validation_reports, validate_with_path,
};
use crate::config::types::InputConfig;
use crate::error::Result;

use super::input;

/// Everything `yamlfix validate` needs once flags and config are merged.
#[derive(Debug, Clone)]
pub struct ValidateCommand {
    pub paths: Vec<PathBuf>,
    pub options: ValidateOptions,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Validate every input. Returns whether all inputs are valid.
pub fn handle_validate(command: ValidateCommand, input_config: &InputConfig) -> Result<bool> {
    let sources = input::collect_sources(&command.paths, input_config)?;
    if sources.is_empty() {
        log::warn!("No YAML files found");
        return Ok(true);
    }

    let reports: Vec<ValidationReport> = sources
        .par_iter()
        .map(|source| {
            let input = input::read_source(source)?;
            Ok(validate_with_path(&input.content, &input.label(), &command.options))
        })
        .collect::<Result<Vec<_>>>()?;

    if !command.quiet {
        let output = format_validation_reports(&reports, command.format);
        if !output.is_empty() {
            print!("{}", output);
            if command.format == OutputFormat::Json {
                println!();
            }
        }
    }

    let valid = reports.iter().all(|r| r.valid);
    log::info!("Validated {} files, all valid: {}", reports.len(), valid);
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn command(paths: Vec<PathBuf>) -> ValidateCommand {
        ValidateCommand {
            paths,
            options: ValidateOptions::default(),
            format: OutputFormat::Stylish,
            quiet: true,
        }
    }

    #[test]
    fn test_validate_never_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "apiVersion v1\nkind: Pod\n").unwrap();

        let valid = handle_validate(command(vec![path.clone()]), &InputConfig::default()).unwrap();
        assert!(!valid);
        assert_eq!(fs::read_to_string(&path).unwrap(), "apiVersion v1\nkind: Pod\n");
    }

    #[test]
    fn test_clean_directory_valid() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), "apiVersion: v1\nkind: Pod\n").unwrap();

        let valid =
            handle_validate(command(vec![dir.path().to_path_buf()]), &InputConfig::default());
        assert!(valid.unwrap());
    }
}
