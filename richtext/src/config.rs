// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::LevelFilter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::{AssetUrlResolver, DEFAULT_ASSET_BASE_ORIGIN};
use crate::sanitize::DEFAULT_IMAGE_LABEL;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const ASSET_BASE_ORIGIN_ENV: &str = "RICHTEXT_ASSET_BASE_ORIGIN";

static CSS_LENGTH_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?(px|vh|em|rem|%)$"));

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AssetsConfig {
    #[serde(default = "default_base_origin")]
    pub base_origin: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_origin: default_base_origin(),
        }
    }
}

fn default_base_origin() -> String {
    DEFAULT_ASSET_BASE_ORIGIN.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RenderingConfig {
    #[serde(default = "default_image_label")]
    pub default_image_label: String,
    #[serde(default = "default_lightbox_max_height")]
    pub lightbox_max_height: String,
    /// Replacement for the embedded view template, relative to the config root.
    #[serde(default)]
    pub view_template: Option<String>,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            default_image_label: default_image_label(),
            lightbox_max_height: default_lightbox_max_height(),
            view_template: None,
        }
    }
}

fn default_image_label() -> String {
    DEFAULT_IMAGE_LABEL.to_string()
}

fn default_lightbox_max_height() -> String {
    "85vh".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rendering: RenderingConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
    pub log_level: LevelFilter,
    pub rendering: RenderingConfig,
    pub view_template_path: Option<PathBuf>,
    /// Whether the values came from a config file rather than built-in defaults.
    pub loaded_from_file: bool,
}

impl ValidatedConfig {
    pub fn asset_resolver(&self) -> AssetUrlResolver {
        AssetUrlResolver::new(&self.assets.base_origin)
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::parse(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Loads `config.yaml` under `root`, falling back to defaults when the
    /// file does not exist. Returns the config and whether a file was read.
    pub fn load_or_default(root: &Path) -> Result<(Self, bool), ConfigError> {
        if !root.join(CONFIG_FILE_NAME).exists() {
            return Ok((Self::default(), false));
        }
        Self::load(root).map(|config| (config, true))
    }

    /// Replaces file values with environment overrides.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(origin) = lookup(ASSET_BASE_ORIGIN_ENV) {
            self.assets.base_origin = origin;
        }
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let (mut config, loaded_from_file) = Self::load_or_default(root)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate_in(root, loaded_from_file)
    }

    pub fn validate(self, loaded_from_file: bool) -> Result<ValidatedConfig, ConfigError> {
        self.validate_in(Path::new(""), loaded_from_file)
    }

    /// Validates the config, resolving file references against `root`.
    pub fn validate_in(
        self,
        root: &Path,
        loaded_from_file: bool,
    ) -> Result<ValidatedConfig, ConfigError> {
        Self::validate_assets(&self.assets)?;
        let log_level = Self::validate_logging(&self.logging)?;
        Self::validate_rendering(&self.rendering)?;
        let view_template_path = Self::resolve_view_template(&self.rendering, root)?;

        Ok(ValidatedConfig {
            assets: self.assets,
            logging: self.logging,
            log_level,
            rendering: self.rendering,
            view_template_path,
            loaded_from_file,
        })
    }

    fn resolve_view_template(
        rendering: &RenderingConfig,
        root: &Path,
    ) -> Result<Option<PathBuf>, ConfigError> {
        let Some(template) = rendering.view_template.as_deref() else {
            return Ok(None);
        };
        let template = template.trim();
        if template.is_empty() {
            return Err(ConfigError::ValidationError(
                "rendering.view_template cannot be empty when set".to_string(),
            ));
        }

        let path = root.join(template);
        if !path.is_file() {
            return Err(ConfigError::ValidationError(format!(
                "rendering.view_template does not exist: {}",
                path.display()
            )));
        }
        Ok(Some(path))
    }

    fn validate_assets(assets: &AssetsConfig) -> Result<(), ConfigError> {
        let origin = assets.base_origin.trim();
        // Empty keeps asset paths root-relative to the page's own origin.
        if origin.is_empty() {
            return Ok(());
        }

        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "assets.base_origin must start with http:// or https://, got: {}",
                origin
            )));
        }

        if origin.contains(['?', '#']) || origin.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "assets.base_origin must not contain a query, fragment or whitespace, got: {}",
                origin
            )));
        }

        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<LevelFilter, ConfigError> {
        match logging.level.to_lowercase().as_str() {
            "trace" => Ok(LevelFilter::Trace),
            "debug" => Ok(LevelFilter::Debug),
            "info" => Ok(LevelFilter::Info),
            "warn" => Ok(LevelFilter::Warn),
            "error" => Ok(LevelFilter::Error),
            other => Err(ConfigError::ValidationError(format!(
                "logging.level must be one of trace, debug, info, warn, error, got: {}",
                other
            ))),
        }
    }

    fn validate_rendering(rendering: &RenderingConfig) -> Result<(), ConfigError> {
        if rendering.default_image_label.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "rendering.default_image_label cannot be empty".to_string(),
            ));
        }

        let height = rendering.lightbox_max_height.trim();
        let valid_height = match CSS_LENGTH_REGEX.as_ref() {
            Ok(regex) => regex.is_match(height),
            Err(error) => {
                return Err(ConfigError::ValidationError(format!(
                    "CSS length pattern failed to compile: {}",
                    error
                )));
            }
        };
        if !valid_height {
            return Err(ConfigError::ValidationError(format!(
                "rendering.lightbox_max_height must be a CSS length such as 85vh or 600px, got: {}",
                height
            )));
        }

        Ok(())
    }
}
