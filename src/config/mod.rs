pub mod types;

use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub use types::Config;

const CONFIG_FILE_NAME: &str = ".yamlfix.toml";

/// Get the global config file path (~/.yamlfix.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (project/.yamlfix.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Read and parse one config file.
pub fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Load configuration.
///
/// An explicit file must exist and parse. Otherwise checks the local config
/// in `project_path` first, then the global config, then falls back to
/// defaults.
pub fn load_config(explicit: Option<&Path>, project_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    if let Some(path) = project_path {
        let local = local_config_path(path);
        if local.exists() {
            return read_config(&local);
        }
    }

    if let Some(global) = global_config_path()
        && global.exists()
    {
        return read_config(&global);
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YamlfixError;
    use tempfile::TempDir;

    #[test]
    fn test_local_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(local_config_path(dir.path()), "[fix]\nindent_step = 4\n").unwrap();

        let config = load_config(None, Some(dir.path())).unwrap();
        assert_eq!(config.fix_options().indent_step, 4);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing), None).unwrap_err();
        assert!(matches!(err, YamlfixError::Config(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_malformed_config_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[fix\nindent_step = ").unwrap();

        let err = load_config(Some(&path), None).unwrap_err();
        assert!(matches!(err, YamlfixError::Config(ConfigError::ParseError { .. })));
        assert!(err.to_string().contains("bad.toml"));
    }
}
