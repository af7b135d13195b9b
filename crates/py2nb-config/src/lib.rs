use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}

/// Settings shared by every conversion in a run.
///
/// Every field is optional in the file; missing ones take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagnostic level, as for `--debug`.
    pub debug: u8,
    /// Directory scanned when no files are named on the command line.
    pub scan_dir: PathBuf,
    /// Extension of the source files picked up by a scan.
    pub extension: String,
    /// Glob patterns of paths a scan skips.
    pub exclude: Vec<String>,
    #[serde(skip)]
    exclude_patterns: Vec<Pattern>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: 0,
            scan_dir: PathBuf::from("."),
            extension: "py".to_string(),
            exclude: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ConfigParseError { source, .. } => ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        log::debug!("loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The config at `path` (or the default location), or defaults if there
    /// is no file.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Ok(loaded.unwrap_or_default())
    }

    /// Parse TOML text, expanding paths and compiling exclude patterns.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config =
            toml::from_str(content).map_err(|source| ConfigError::ConfigParseError {
                config_path: PathBuf::new(),
                source,
            })?;

        // Expand shell variables and tilde in the scan directory
        config.scan_dir = Self::expand_path(&config.scan_dir).unwrap_or(config.scan_dir);
        config.compile_patterns()?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/py2nb");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Whether a scan should skip `path`. Patterns are tried against the
    /// whole path and against the file name alone.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let file_name = path.file_name().map(Path::new);
        self.exclude_patterns.iter().any(|pattern| {
            pattern.matches_path(path) || file_name.is_some_and(|name| pattern.matches_path(name))
        })
    }

    fn compile_patterns(&mut self) -> Result<(), ConfigError> {
        self.exclude_patterns = self
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/py2nb/config.toml"));
    }

    #[test]
    fn test_defaults_when_fields_are_missing() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.extension, "py");
        assert_eq!(config.scan_dir, PathBuf::from("."));
    }

    #[test]
    fn test_all_fields() {
        let config = Config::from_toml(
            r#"
debug = 2
scan_dir = "/srv/code"
extension = "pyw"
exclude = ["build", "*_test.py"]
"#,
        )
        .unwrap();

        assert_eq!(config.debug, 2);
        assert_eq!(config.scan_dir, PathBuf::from("/srv/code"));
        assert_eq!(config.extension, "pyw");
        assert_eq!(config.exclude.len(), 2);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_scan_dir_with_env_var_in_toml() {
        unsafe {
            env::set_var("PY2NB_TEST_ROOT", "/custom/code");
        }

        let config = Config::from_toml(r#"scan_dir = "$PY2NB_TEST_ROOT/src""#).unwrap();
        assert_eq!(config.scan_dir, PathBuf::from("/custom/code/src"));

        unsafe {
            env::remove_var("PY2NB_TEST_ROOT");
        }
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        let path = PathBuf::from("relative/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_exclude_matches_file_name_and_path() {
        let config =
            Config::from_toml(r#"exclude = ["setup.py", "*/migrations/*", "__pycache__"]"#)
                .unwrap();

        assert!(config.is_excluded(Path::new("pkg/setup.py")));
        assert!(config.is_excluded(Path::new("app/migrations/0001.py")));
        assert!(config.is_excluded(Path::new("pkg/__pycache__")));
        assert!(!config.is_excluded(Path::new("pkg/models.py")));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let result = Config::from_toml(r#"exclude = ["[unclosed"]"#);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("config.toml");

        let config = Config::load_or_default(Some(&missing)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "debug = 1\nexclude = [\"venv\"]\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.debug, 1);
        assert!(config.is_excluded(&temp_dir.path().join("venv")));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "debug = \"loud\"\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
