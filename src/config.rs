//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <file>`, else `$XDG_CONFIG_HOME/feedsift/feedsift.toml`
//! 3. Environment variables: `FEEDSIFT_*` prefix
//! 4. Command-line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::application::filter::FilterRules;
use crate::application::matcher::{MatchPolicy, DEFAULT_THRESHOLD};
use crate::application::ApplicationError;
use crate::domain::DEFAULT_PLACEHOLDER;

/// When to color console output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!("invalid color choice: {other}")),
        }
    }
}

/// Unified configuration for feedsift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Match keep-list titles approximately instead of exactly
    pub fuzzy: bool,
    /// Fuzzy similarity threshold in percent (0-100)
    pub threshold: u8,
    /// Console coloring
    pub color: ColorChoice,
    /// Element names descended into
    pub container_tags: Vec<String>,
    /// Element names presented for a decision
    pub item_tags: Vec<String>,
    /// Element name holding an item's title
    pub title_tag: String,
    /// Shown for items without a usable title
    pub placeholder: String,
    /// Keep-list used when none is given on the command line
    pub keep_titles: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let rules = FilterRules::default();
        Self {
            fuzzy: false,
            threshold: DEFAULT_THRESHOLD,
            color: ColorChoice::Auto,
            container_tags: rules.container_tags,
            item_tags: rules.item_tags,
            title_tag: rules.title_tag,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            keep_titles: None,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub fuzzy: Option<bool>,
    pub threshold: Option<u8>,
    pub color: Option<ColorChoice>,
    pub container_tags: Option<Vec<String>>,
    pub item_tags: Option<Vec<String>>,
    pub title_tag: Option<String>,
    pub placeholder: Option<String>,
    pub keep_titles: Option<PathBuf>,
}

/// Get the XDG config directory for feedsift.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "feedsift").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("feedsift.toml"))
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

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the path as written.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given. Without
    ///   it the global config is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Overlay wins where it specifies a value; lists are replaced, not merged.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            fuzzy: overlay.fuzzy.unwrap_or(self.fuzzy),
            threshold: overlay.threshold.unwrap_or(self.threshold),
            color: overlay.color.unwrap_or(self.color),
            container_tags: overlay
                .container_tags
                .clone()
                .unwrap_or_else(|| self.container_tags.clone()),
            item_tags: overlay
                .item_tags
                .clone()
                .unwrap_or_else(|| self.item_tags.clone()),
            title_tag: overlay
                .title_tag
                .clone()
                .unwrap_or_else(|| self.title_tag.clone()),
            placeholder: overlay
                .placeholder
                .clone()
                .unwrap_or_else(|| self.placeholder.clone()),
            keep_titles: overlay
                .keep_titles
                .clone()
                .or_else(|| self.keep_titles.clone()),
        }
    }

    /// Apply FEEDSIFT_* environment variables as explicit overrides.
    ///
    /// Lists are comma separated: `FEEDSIFT_ITEM_TAGS=item,entry`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("FEEDSIFT"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("fuzzy") {
            settings.fuzzy = val;
        }
        if let Ok(val) = config.get_string("threshold") {
            settings.threshold = val.trim().parse().map_err(|_| ApplicationError::Config {
                message: format!("FEEDSIFT_THRESHOLD must be 0-100, got {val:?}"),
            })?;
        }
        if let Ok(val) = config.get_string("color") {
            settings.color = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("container_tags") {
            settings.container_tags = split_list(&val);
        }
        if let Ok(val) = config.get_string("item_tags") {
            settings.item_tags = split_list(&val);
        }
        if let Ok(val) = config.get_string("title_tag") {
            settings.title_tag = val;
        }
        if let Ok(val) = config.get_string("placeholder") {
            settings.placeholder = val;
        }
        if let Ok(val) = config.get_string("keep_titles") {
            settings.keep_titles = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.keep_titles {
            self.keep_titles = Some(expand_path(path));
        }
    }

    /// Reject settings no run could work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.threshold > 100 {
            return Err(ApplicationError::Config {
                message: format!("threshold must be 0-100, got {}", self.threshold),
            });
        }
        if self.item_tags.is_empty() {
            return Err(ApplicationError::Config {
                message: "item_tags must name at least one element".to_string(),
            });
        }
        if self.title_tag.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "title_tag must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Traversal rules derived from these settings.
    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            container_tags: self.container_tags.clone(),
            item_tags: self.item_tags.clone(),
            title_tag: self.title_tag.clone(),
            placeholder: self.placeholder.clone(),
        }
    }

    /// Keep-list matching policy derived from these settings.
    pub fn match_policy(&self) -> MatchPolicy {
        if self.fuzzy {
            MatchPolicy::Fuzzy {
                threshold: self.threshold,
            }
        } else {
            MatchPolicy::Exact
        }
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
