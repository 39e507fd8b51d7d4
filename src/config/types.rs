use serde::{Deserialize, Serialize};

use crate::analyzer::yamlfix::{ConfidenceBands, FixOptions, OutputFormat, ValidateOptions};
use crate::error::ConfigError;

/// Contents of a `.yamlfix.toml` file. Every table and field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fix: FixConfig,
    pub validate: ValidateConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// `[fix]` table: defaults for `yamlfix fix`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggressive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_bands: Option<ConfidenceBands>,
}

/// `[validate]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_step: Option<usize>,
}

/// `[input]` table: which files a directory walk picks up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub max_file_size: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".to_string(), "yml".to_string()],
            ignore_patterns: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
            ],
            max_file_size: 1024 * 1024, // 1MB
        }
    }
}

/// `[output]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `stylish`, `json` or `diff`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Engine options with file values layered over the defaults.
    pub fn fix_options(&self) -> FixOptions {
        let defaults = FixOptions::default();
        FixOptions {
            aggressive: self.fix.aggressive.unwrap_or(defaults.aggressive),
            indent_step: self.fix.indent_step.unwrap_or(defaults.indent_step),
            confidence_threshold: self
                .fix
                .confidence_threshold
                .unwrap_or(defaults.confidence_threshold),
            max_iterations: self.fix.max_iterations.unwrap_or(defaults.max_iterations),
            confidence_bands: self.fix.confidence_bands.unwrap_or(defaults.confidence_bands),
        }
    }

    /// Validation options; `[validate]` wins over `[fix]` for the step.
    pub fn validate_options(&self) -> ValidateOptions {
        let step = self
            .validate
            .indent_step
            .or(self.fix.indent_step)
            .unwrap_or(ValidateOptions::default().indent_step);
        ValidateOptions::default().with_indent_step(step)
    }

    /// Configured output format, if any.
    pub fn output_format(&self) -> Result<Option<OutputFormat>, ConfigError> {
        match self.output.format.as_deref() {
            None => Ok(None),
            Some(name) => OutputFormat::parse(name)
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "output.format".to_string(),
                    message: format!("unknown format `{}`", name),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.fix_options(), FixOptions::default());
        assert_eq!(config.validate_options(), ValidateOptions::default());
        assert_eq!(config.input.extensions, vec!["yaml", "yml"]);
        assert!(config.output_format().unwrap().is_none());
    }

    #[test]
    fn test_fix_table() {
        let config: Config = toml::from_str(
            "[fix]\naggressive = true\nindent_step = 4\nconfidence_threshold = 0.8\n\n[fix.confidence_bands]\nlow = 0.5\n",
        )
        .unwrap();

        let options = config.fix_options();
        assert!(options.aggressive);
        assert_eq!(options.indent_step, 4);
        assert_eq!(options.confidence_threshold, 0.8);
        assert_eq!(options.max_iterations, 3);
        assert_eq!(options.confidence_bands.low, 0.5);
        assert_eq!(options.confidence_bands.high, 0.95);

        assert_eq!(config.validate_options().indent_step, 4);
    }

    #[test]
    fn test_validate_step_overrides_fix_step() {
        let config: Config =
            toml::from_str("[fix]\nindent_step = 4\n[validate]\nindent_step = 2\n").unwrap();
        assert_eq!(config.validate_options().indent_step, 2);
    }

    #[test]
    fn test_output_format() {
        let config: Config = toml::from_str("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.output_format().unwrap(), Some(OutputFormat::Json));

        let config: Config = toml::from_str("[output]\nformat = \"xml\"\n").unwrap();
        assert!(config.output_format().is_err());
    }
}
