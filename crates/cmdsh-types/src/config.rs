//! Shell configuration loaded from TOML.
//!
//! ```toml
//! prompt = "cmd> "
//! max_dofile_depth = 1024
//! command_column_width = 12
//! file_column_width = 16
//! columns_per_row = 5
//! log_filter = "warn"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{CmdshError, Result};

/// Default cap on nested dofiles.
pub const DEFAULT_MAX_DOFILE_DEPTH: usize = 1024;

/// Runtime configuration for the shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before every interactive line.
    pub prompt: String,
    /// Maximum number of nested dofiles.
    pub max_dofile_depth: usize,
    /// Column width used when listing command names on Tab.
    pub command_column_width: usize,
    /// Column width used when listing directory entries on Tab.
    pub file_column_width: usize,
    /// Entries per row in Tab listings.
    pub columns_per_row: usize,
    /// Default `env_logger` filter (overridden by `RUST_LOG`).
    pub log_filter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "cmd> ".to_string(),
            max_dofile_depth: DEFAULT_MAX_DOFILE_DEPTH,
            command_column_width: 12,
            file_column_width: 16,
            columns_per_row: 5,
            log_filter: "warn".to_string(),
        }
    }
}

impl ShellConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.max_dofile_depth == 0 {
            return Err(CmdshError::Config(
                "max_dofile_depth must be at least 1".to_string(),
            ));
        }
        if self.columns_per_row == 0 {
            return Err(CmdshError::Config(
                "columns_per_row must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ShellConfig::default();
        assert_eq!(c.prompt, "cmd> ");
        assert_eq!(c.max_dofile_depth, 1024);
        assert_eq!(c.command_column_width, 12);
        assert_eq!(c.file_column_width, 16);
        assert_eq!(c.columns_per_row, 5);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ShellConfig::from_toml_str("prompt = \"mydb> \"").unwrap();
        assert_eq!(c.prompt, "mydb> ");
        assert_eq!(c.max_dofile_depth, DEFAULT_MAX_DOFILE_DEPTH);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ShellConfig::from_toml_str("").unwrap(), ShellConfig::default());
    }

    #[test]
    fn zero_depth_rejected() {
        let err = ShellConfig::from_toml_str("max_dofile_depth = 0").unwrap_err();
        assert!(matches!(err, CmdshError::Config(_)));
    }

    #[test]
    fn zero_columns_rejected() {
        assert!(ShellConfig::from_toml_str("columns_per_row = 0").is_err());
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = ShellConfig::from_toml_str("prompt = ").unwrap_err();
        assert!(matches!(err, CmdshError::TomlParse(_)));
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = ShellConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(c, ShellConfig::default());
    }

    #[test]
    fn load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdsh.toml");
        std::fs::write(&path, "columns_per_row = 3\nfile_column_width = 20\n").unwrap();
        let c = ShellConfig::load(&path).unwrap();
        assert_eq!(c.columns_per_row, 3);
        assert_eq!(c.file_column_width, 20);
    }
}
