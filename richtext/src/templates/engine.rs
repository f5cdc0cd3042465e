// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{Environment, Value, default_auto_escape_callback};
use std::collections::HashMap;
use std::fs;

use crate::config::{ConfigError, ValidatedConfig};

pub const VIEW_TEMPLATE_NAME: &str = "rich_text/view.html";

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error>;
}

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        Self::with_overrides(HashMap::new())
    }

    /// Engine whose templates named in `overrides` replace the embedded ones.
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(move |name| match overrides.get(name) {
            Some(source) => Ok(Some(source.clone())),
            None => embedded_template_loader(name),
        });
        Self { env }
    }

    /// Builds the engine, reading the site's view template when one is configured.
    pub fn from_config(config: &ValidatedConfig) -> Result<Self, ConfigError> {
        let mut overrides = HashMap::new();
        if let Some(path) = &config.view_template_path {
            let source = fs::read_to_string(path).map_err(|e| {
                ConfigError::LoadError(format!(
                    "Failed to read view template '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            log::info!("Using view template override {}", path.display());
            overrides.insert(VIEW_TEMPLATE_NAME.to_string(), source);
        }
        Ok(Self::with_overrides(overrides))
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template_name)?;
        tmpl.render(context)
    }
}

/// Template loader for minijinja that loads from embedded sources
fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template_content = match name {
        VIEW_TEMPLATE_NAME => Some(include_str!("../view/templates/view.html")),
        _ => None,
    };

    Ok(template_content.map(|s| s.to_string()))
}
