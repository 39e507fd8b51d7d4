//! Input discovery: files, directory walks and stdin.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::types::InputConfig;
use crate::error::{Result, YamlfixError};

/// Where one document stream comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// Path used in reports.
    pub fn label(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// A source with its content loaded.
#[derive(Debug, Clone)]
pub struct Input {
    pub source: Source,
    pub content: String,
}

impl Input {
    pub fn label(&self) -> String {
        self.source.label()
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn has_extension(path: &Path, config: &InputConfig) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| config.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

fn is_ignored(name: &str, config: &InputConfig) -> bool {
    config.ignore_patterns.iter().any(|p| p == name)
}

/// Expand command-line paths into sources.
///
/// Files named explicitly are taken regardless of extension; directories are
/// walked for files with a configured extension.
pub fn collect_sources(paths: &[PathBuf], config: &InputConfig) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    for path in paths {
        if is_stdin(path) {
            if !sources.contains(&Source::Stdin) {
                sources.push(Source::Stdin);
            }
            continue;
        }
        if !path.exists() {
            return Err(YamlfixError::InvalidInput(format!(
                "{} does not exist",
                path.display()
            )));
        }
        if path.is_file() {
            sources.push(Source::File(path.clone()));
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || e.file_name().to_str().is_none_or(|name| !is_ignored(name, config))
            })
        {
            let entry = entry.map_err(|e| YamlfixError::Walk {
                path: path.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() || !has_extension(entry.path(), config) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size > config.max_file_size {
                log::warn!(
                    "Skipping {} ({} bytes exceeds max_file_size)",
                    entry.path().display(),
                    size
                );
                continue;
            }
            found.push(entry.into_path());
        }

        found.sort();
        log::debug!("Found {} YAML files under {}", found.len(), path.display());
        sources.extend(found.into_iter().map(Source::File));
    }

    Ok(sources)
}

/// Load the content of a source.
pub fn read_source(source: &Source) -> Result<Input> {
    let content = match source {
        Source::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Source::File(path) => fs::read_to_string(path).map_err(|source| YamlfixError::ReadFile {
            path: path.clone(),
            source,
        })?,
    };
    Ok(Input {
        source: source.clone(),
        content,
    })
}

/// Write fixed content back in place.
pub fn write_back(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| YamlfixError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_walk_filters() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), "kind: Pod\n").unwrap();
        fs::write(dir.path().join("b.yml"), "kind: Pod\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules").join("c.yaml"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("d.YAML"), "x").unwrap();

        let sources =
            collect_sources(&[dir.path().to_path_buf()], &InputConfig::default()).unwrap();
        let names: Vec<String> = sources
            .iter()
            .map(|s| match s {
                Source::File(p) => p.file_name().unwrap().to_string_lossy().to_string(),
                Source::Stdin => "-".to_string(),
            })
            .collect();

        assert_eq!(names.len(), 3);
        assert!(names.contains(&"a.yaml".to_string()));
        assert!(names.contains(&"b.yml".to_string()));
        assert!(names.contains(&"d.YAML".to_string()));
    }

    #[test]
    fn test_explicit_file_any_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.txt");
        fs::write(&path, "kind: Pod\n").unwrap();

        let sources = collect_sources(&[path.clone()], &InputConfig::default()).unwrap();
        assert_eq!(sources, vec![Source::File(path)]);
    }

    #[test]
    fn test_missing_path_is_error() {
        let err = collect_sources(
            &[PathBuf::from("/definitely/not/here.yaml")],
            &InputConfig::default(),
        );
        assert!(matches!(err, Err(YamlfixError::InvalidInput(_))));
    }

    #[test]
    fn test_stdin_deduplicated() {
        let paths = vec![PathBuf::from("-"), PathBuf::from("-")];
        let sources = collect_sources(&paths, &InputConfig::default()).unwrap();
        assert_eq!(sources, vec![Source::Stdin]);
    }

    #[test]
    fn test_read_and_write_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "kind: Pod\n").unwrap();

        let input = read_source(&Source::File(path.clone())).unwrap();
        assert_eq!(input.content, "kind: Pod\n");

        write_back(&path, "kind: Service\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kind: Service\n");
    }
}
