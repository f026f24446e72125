//! Loader configuration.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoaderConfig {
    /// Maximum number of operations a single script may run.
    #[serde(default = "default_max_operations")]
    pub max_operations: u64,
    #[serde(default = "default_max_expr_depth")]
    pub max_expr_depth: usize,
    #[serde(default = "default_max_call_levels")]
    pub max_call_levels: usize,
    /// Longest string a script may build, in bytes.
    #[serde(default = "default_max_string_size")]
    pub max_string_size: usize,
    #[serde(default = "default_max_collection_size")]
    pub max_array_size: usize,
    #[serde(default = "default_max_collection_size")]
    pub max_map_size: usize,
    /// Regular expressions matched against paths skipped by the scanner.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default = "default_rhai_extension")]
    pub rhai_extension: String,
    #[serde(default = "default_yaml_extensions")]
    pub yaml_extensions: Vec<String>,
}

fn default_max_operations() -> u64 {
    1_000_000
}

fn default_max_expr_depth() -> usize {
    64
}

fn default_max_call_levels() -> usize {
    64
}

fn default_max_string_size() -> usize {
    1024 * 1024
}

fn default_max_collection_size() -> usize {
    10_000
}

fn default_rhai_extension() -> String {
    "rhai".to_string()
}

fn default_yaml_extensions() -> Vec<String> {
    vec!["yml".to_string(), "yaml".to_string()]
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_operations: default_max_operations(),
            max_expr_depth: default_max_expr_depth(),
            max_call_levels: default_max_call_levels(),
            max_string_size: default_max_string_size(),
            max_array_size: default_max_collection_size(),
            max_map_size: default_max_collection_size(),
            exclude: Vec::new(),
            rhai_extension: default_rhai_extension(),
            yaml_extensions: default_yaml_extensions(),
        }
    }
}

impl LoaderConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: LoaderConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_operations == 0 {
            anyhow::bail!("max_operations must be greater than zero");
        }
        if self.max_expr_depth == 0 || self.max_call_levels == 0 {
            anyhow::bail!("max_expr_depth and max_call_levels must be greater than zero");
        }
        if self.max_string_size == 0 || self.max_array_size == 0 || self.max_map_size == 0 {
            anyhow::bail!("max_string_size, max_array_size and max_map_size must be greater than zero");
        }
        if self.rhai_extension.trim().is_empty() {
            anyhow::bail!("rhai_extension must not be empty");
        }
        if self.yaml_extensions.iter().any(|e| e.trim().is_empty()) {
            anyhow::bail!("yaml_extensions must not contain empty entries");
        }
        if self
            .yaml_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&self.rhai_extension))
        {
            anyhow::bail!(
                "Extension '{}' is configured for both Rhai and YAML documents",
                self.rhai_extension
            );
        }
        self.exclude_patterns()?;
        Ok(())
    }

    /// Compiled exclusion patterns.
    pub fn exclude_patterns(&self) -> Result<Vec<Regex>, anyhow::Error> {
        self.exclude
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| anyhow::anyhow!("Invalid exclude pattern '{pattern}': {e}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.max_operations, 1_000_000);
        assert_eq!(config.max_expr_depth, 64);
        assert_eq!(config.max_string_size, 1024 * 1024);
        assert_eq!(config.max_map_size, 10_000);
        assert_eq!(config.rhai_extension, "rhai");
        assert_eq!(config.yaml_extensions, vec!["yml", "yaml"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: LoaderConfig = serde_yaml::from_str("max_operations: 500\n").unwrap();
        assert_eq!(config.max_operations, 500);
        assert_eq!(config.max_call_levels, 64);
        assert_eq!(config.max_array_size, 10_000);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "exclude:\n  - \"/drafts/\"\nrhai_extension: contract").unwrap();
        let config = LoaderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.rhai_extension, "contract");
        assert_eq!(config.exclude_patterns().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let config = LoaderConfig {
            exclude: vec!["([".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid exclude pattern"));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = LoaderConfig {
            max_operations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_size_limits_rejected() {
        let config = LoaderConfig {
            max_array_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlapping_extensions_rejected() {
        let config = LoaderConfig {
            rhai_extension: "yml".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
