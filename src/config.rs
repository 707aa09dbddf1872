use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NotifyGenError, Result};

/// Raw generation options, as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationOptions {
    /// Method names recognised for raising the change event, in priority order
    #[serde(default = "default_raise_method_names")]
    pub raise_method_names: Vec<String>,

    /// First letter rule for generated names (upper_case, lower_case, none)
    #[serde(default = "default_first_letter_capitalization")]
    pub first_letter_capitalization: String,
}

fn default_raise_method_names() -> Vec<String> {
    DEFAULT_RAISE_METHOD_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_first_letter_capitalization() -> String {
    "upper_case".to_string()
}

pub const DEFAULT_RAISE_METHOD_NAMES: [&str; 4] = [
    "OnPropertyChanged",
    "RaisePropertyChanged",
    "NotifyOfPropertyChange",
    "NotifyPropertyChanged",
];

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            raise_method_names: default_raise_method_names(),
            first_letter_capitalization: default_first_letter_capitalization(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Default output format (text or json)
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Analysis options
    #[serde(default)]
    pub generation: GenerationOptions,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| NotifyGenError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| NotifyGenError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["notifygen.toml", ".notifygen.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifygen.toml");

        let mut config = Config::default();
        config.generation.raise_method_names = vec!["Notify".to_string()];
        config.generation.first_letter_capitalization = "none".to_string();
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifygen.toml");
        std::fs::write(&path, "[generation]\nfirst_letter_capitalization = \"lower_case\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.generation.first_letter_capitalization, "lower_case");
        assert_eq!(config.generation.raise_method_names[0], "OnPropertyChanged");
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_missing_explicit_path_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifygen.toml");
        std::fs::write(&path, "[generation\n").unwrap();

        assert!(matches!(Config::load(&path), Err(NotifyGenError::Config(_))));
    }
}
