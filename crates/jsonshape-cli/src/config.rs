//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//! - Environment variables (via `JSONSHAPE_CONFIG`, handled by clap)
//! - Command-line arguments, which the handlers apply on top

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use jsonshape_core::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for validate and assert
    pub validation: ValidationConfig,

    /// Defaults for diff
    pub diff: DiffConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// User-defined named patterns, referenced as `@name` in schema files
    pub patterns: BTreeMap<String, String>,
}

/// Validation defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accept missing values everywhere
    pub partial: bool,

    /// Substitute schema fallbacks for missing values
    pub fallback: bool,
}

/// Diff defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub src_partial: bool,
    pub dst_partial: bool,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format used when `--output` is left at its default
    pub format: OutputFormat,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used without `-v` (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,

    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file: None,
        }
    }
}

/// On-disk configuration format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config: Config = match FileFormat::of(path) {
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?,
        };

        config.check_patterns()?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".jsonshape.toml"),
            PathBuf::from(".jsonshape.yaml"),
            PathBuf::from(".jsonshape.json"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("jsonshape").join("config.toml"));
        }

        paths
    }

    /// Every user pattern must compile and must not shadow a built-in one
    fn check_patterns(&self) -> Result<()> {
        for (name, source) in &self.patterns {
            if jsonshape_core::patterns::named(name).is_some() {
                return Err(Error::config(format!(
                    "pattern '{}' shadows a built-in pattern",
                    name
                )));
            }
            Pattern::new(source.as_str())?;
        }
        Ok(())
    }

    /// Source text of a user-defined pattern
    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }

    /// Render the configuration in the format used for the given path
    pub fn render_for(&self, path: &Path) -> Result<String> {
        Ok(match FileFormat::of(path) {
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        })
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render_for(path)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.validation.partial);
        assert!(!config.diff.dst_partial);
        assert_eq!(config.output.format, OutputFormat::Human);
        assert_eq!(config.logging.level, "warn");
        assert!(config.patterns.is_empty());
    }

    #[test]
    fn test_toml_file_with_partial_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[validation]\nfallback = true\n\n[patterns]\nsku = \"^[A-Z]{3}-[0-9]{4}$\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.validation.fallback);
        assert!(!config.validation.partial);
        assert_eq!(config.pattern("sku"), Some("^[A-Z]{3}-[0-9]{4}$"));
    }

    #[test]
    fn test_yaml_and_json_by_extension() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("config.yaml");
        std::fs::write(&yaml, "diff:\n  src_partial: true\n").unwrap();
        assert!(Config::from_file(&yaml).unwrap().diff.src_partial);

        let json = dir.path().join("config.json");
        std::fs::write(&json, r#"{"output": {"format": "json-pretty"}}"#).unwrap();
        assert_eq!(
            Config::from_file(&json).unwrap().output.format,
            OutputFormat::JsonPretty
        );
    }

    #[test]
    fn test_invalid_user_pattern_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[patterns]\nbroken = \"(\"\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Core(_))));
    }

    #[test]
    fn test_user_pattern_cannot_shadow_builtin() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[patterns]\nemail = \".*\"\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = Config::load_with_file(Some(Path::new("/nonexistent/jsonshape.toml")));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(".jsonshape.toml");

        let mut config = Config::default();
        config.validation.partial = true;
        config.patterns.insert("sku".into(), "^[A-Z]+$".into());
        config.save(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
    }
}
