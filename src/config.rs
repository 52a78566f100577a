//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <file>`, else `$XDG_CONFIG_HOME/querytree/querytree.toml`
//! 3. Environment variables: `QUERYTREE_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{FieldCatalog, FieldDef};

/// Which tree a new session starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seed {
    /// Two nested example groups
    #[default]
    Sample,
    /// Root group with one default condition
    Blank,
}

impl FromStr for Seed {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sample" => Ok(Seed::Sample),
            "blank" => Ok(Seed::Blank),
            other => Err(ApplicationError::Config {
                message: format!("unknown seed '{}' (expected sample or blank)", other),
            }),
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Sample => f.write_str("sample"),
            Seed::Blank => f.write_str("blank"),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub seed: Option<Seed>,
    pub fields: Option<Vec<FieldDef>>,
}

/// Unified configuration for querytree.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Settings {
    /// Starting tree of a session
    pub seed: Seed,
    /// Field catalog offered to conditions; first entry is the default
    pub fields: FieldCatalog,
}

/// Get the XDG config directory for querytree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "querytree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("querytree.toml"))
}

/// Expand `~` and `$VAR` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value. A `fields` list replaces the
    /// whole catalog.
    fn merge_with(&self, overlay: RawSettings) -> ApplicationResult<Self> {
        let fields = match overlay.fields {
            Some(fields) => FieldCatalog::new(fields)?,
            None => self.fields.clone(),
        };
        Ok(Self {
            seed: overlay.seed.unwrap_or(self.seed),
            fields,
        })
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given. Without
    ///   it the global XDG file is used if present.
    pub fn load(config_file: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file
        let path = match config_file {
            Some(path) => {
                let path = expand_path(path);
                if !path.exists() {
                    return Err(ApplicationError::ConfigNotFound(path));
                }
                Some(path)
            }
            None => global_config_path().filter(|p| p.exists()),
        };
        if let Some(path) = path {
            let raw = load_raw_settings(&path)?;
            current = current.merge_with(raw)?;
        }

        // 3. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Parse settings from TOML text on top of the defaults.
    pub fn from_toml(content: &str) -> ApplicationResult<Self> {
        let raw = parse_raw_settings(content).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })?;
        Self::default().merge_with(raw)
    }

    /// Apply QUERYTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("QUERYTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("seed") {
            settings.seed = val.parse()?;
        }

        Ok(settings)
    }

    /// Render as a TOML document, suitable as a config template.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_parse_rejects_unknown() {
        assert_eq!("Blank".parse::<Seed>().unwrap(), Seed::Blank);
        assert!("random".parse::<Seed>().is_err());
    }

    #[test]
    fn template_round_trips_through_parser() {
        let defaults = Settings::default();
        let text = defaults.to_toml().unwrap();

        let parsed = Settings::from_toml(&text).unwrap();

        assert_eq!(parsed, defaults);
    }
}
