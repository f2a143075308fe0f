//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/studycon/studycon.toml`
//! 3. Local config: `<dir>/.studycon.toml`
//! 4. Environment variables: `STUDYCON_*` prefix, `__` for nesting

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::evaluator::DEFAULT_TOP_N;
use crate::domain::MergePolicy;

/// Tree reconciliation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MergeConfig {
    pub policy: MergePolicy,
}

/// Recommendation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of courses in a recommendation
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Item id generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdConfig {
    /// Fixed seed for reproducible ids; random when unset
    pub seed: Option<u64>,
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub merge: RawMergeConfig,
    pub ranking: RawRankingConfig,
    pub ids: IdConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawMergeConfig {
    pub policy: Option<MergePolicy>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRankingConfig {
    pub top_n: Option<usize>,
}

/// Unified configuration for studycon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Persisted tree document (default: ~/.studycon/tree.json)
    pub store_path: PathBuf,
    pub merge: MergeConfig,
    pub ranking: RankingConfig,
    pub ids: IdConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            merge: MergeConfig::default(),
            ranking: RankingConfig::default(),
            ids: IdConfig::default(),
        }
    }
}

/// Get the default tree document path (~/.studycon/tree.json).
fn default_store_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".studycon").join("tree.json"))
        .unwrap_or_else(|| PathBuf::from("~/.studycon/tree.json"))
}

/// Get the XDG config directory for studycon.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "studycon").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("studycon.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".studycon.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; the input is returned unchanged on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_path.to_string_lossy().as_ref());
        self.store_path = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            merge: MergeConfig {
                policy: overlay.merge.policy.unwrap_or(self.merge.policy),
            },
            ranking: RankingConfig {
                top_n: overlay.ranking.top_n.unwrap_or(self.ranking.top_n),
            },
            ids: IdConfig {
                seed: overlay.ids.seed.or(self.ids.seed),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.studycon.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Load a single TOML file on top of the defaults (no global, no env).
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let mut settings = Self::default().merge_with(&raw);
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply STUDYCON_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("STUDYCON")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("merge.policy") {
            settings.merge.policy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get::<usize>("ranking.top_n") {
            settings.ranking.top_n = val;
        }
        if let Ok(val) = config.get::<u64>("ids.seed") {
            settings.ids.seed = Some(val);
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.ranking.top_n == 0 {
            return Err(ApplicationError::Config {
                message: "ranking.top_n must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize settings to TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }

    /// Commented example configuration.
    pub fn template() -> String {
        r#"# studycon configuration
# Global: ~/.config/studycon/studycon.toml
# Local:  <dir>/.studycon.toml

# Persisted tree document
# store_path = "~/.studycon/tree.json"

[merge]
# "cross-product": every L3 pair below a matched L2 pair takes the max
# "name-matched": only same-named L3 pairs take the max
# policy = "cross-product"

[ranking]
# top_n = 3

[ids]
# seed = 42
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_then_cross_product_and_top_three() {
        let settings = Settings::default();
        assert_eq!(settings.merge.policy, MergePolicy::CrossProduct);
        assert_eq!(settings.ranking.top_n, 3);
        assert_eq!(settings.ids.seed, None);
        assert!(settings.store_path.ends_with("tree.json"));
    }

    #[test]
    fn given_overlay_then_only_specified_fields_change() {
        let raw: RawSettings = toml::from_str(
            r#"
[ranking]
top_n = 5
"#,
        )
        .unwrap();
        let merged = Settings::default().merge_with(&raw);
        assert_eq!(merged.ranking.top_n, 5);
        assert_eq!(merged.merge.policy, MergePolicy::CrossProduct);
    }

    #[test]
    fn given_policy_string_then_parses_kebab_case() {
        let raw: RawSettings = toml::from_str(
            r#"
[merge]
policy = "name-matched"
"#,
        )
        .unwrap();
        assert_eq!(raw.merge.policy, Some(MergePolicy::NameMatched));
    }

    #[test]
    fn given_tilde_in_store_path_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            store_path: PathBuf::from("~/trees/tree.json"),
            ..Settings::default()
        };
        settings.expand_paths();
        assert!(!settings.store_path.to_string_lossy().starts_with('~'));
        assert!(settings.store_path.ends_with("trees/tree.json"));
    }

    #[test]
    fn given_zero_top_n_then_validation_fails() {
        let settings = Settings {
            ranking: RankingConfig { top_n: 0 },
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips() {
        let settings = Settings {
            ids: IdConfig { seed: Some(42) },
            ..Settings::default()
        };
        let toml_str = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn given_template_then_parses_as_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.store_path.is_none());
        assert!(raw.merge.policy.is_none());
    }
}
