//! CLI configuration.
//!
//! Settings come from an optional YAML file. The file is taken from
//! `--config` when given, otherwise from `$QUARRY_CONFIG`, otherwise
//! defaults apply. Command-line flags override whatever the file says.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "QUARRY_CONFIG";

/// How check results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
    /// Human-readable summary
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub output: OutputFormat,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parses YAML config text. An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Loads the config named by the flag or, failing that, the environment.
    pub fn resolve(flag: Option<&Path>, env: Option<OsString>) -> Result<Self> {
        match config_path(flag, env) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

fn config_path(flag: Option<&Path>, env: Option<OsString>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = CliConfig::default();
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = CliConfig::parse("output: yaml\n").unwrap();
        assert_eq!(config.output, OutputFormat::Yaml);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(CliConfig::parse("\n").unwrap(), CliConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(CliConfig::parse("colour: always\n").is_err());
    }

    #[test]
    fn unknown_output_rejected() {
        assert!(CliConfig::parse("output: xml\n").is_err());
    }

    #[test]
    fn flag_wins_over_env() {
        let from_flag = write_config("output: text\nlog_level: debug\n");
        let from_env = write_config("output: yaml\n");

        let config = CliConfig::resolve(
            Some(from_flag.path()),
            Some(from_env.path().as_os_str().to_owned()),
        )
        .unwrap();
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn env_used_without_flag() {
        let from_env = write_config("output: yaml\n");
        let config =
            CliConfig::resolve(None, Some(from_env.path().as_os_str().to_owned())).unwrap();
        assert_eq!(config.output, OutputFormat::Yaml);
    }

    #[test]
    fn nothing_configured() {
        assert_eq!(
            CliConfig::resolve(None, Some(OsString::new())).unwrap(),
            CliConfig::default()
        );
        assert_eq!(CliConfig::resolve(None, None).unwrap(), CliConfig::default());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CliConfig::load(Path::new("/nonexistent/quarry.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/quarry.yaml"));
    }
}
