// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

/// Origin used for uploaded media when nothing else is configured.
pub const DEFAULT_ASSET_BASE_ORIGIN: &str = "http://localhost:1337";

/// Turns asset paths coming from the content API into absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrlResolver {
    base_origin: String,
}

impl AssetUrlResolver {
    pub fn new(base_origin: &str) -> Self {
        Self {
            base_origin: base_origin.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    /// Resolves `path` against the asset origin.
    ///
    /// Empty input yields an empty string, which callers treat as "no image".
    /// Absolute `http(s)` URLs are returned unchanged.
    pub fn resolve(&self, path: &str) -> String {
        if path.trim().is_empty() {
            return String::new();
        }
        if is_absolute_http(path) {
            return path.to_string();
        }

        let relative = path.trim_start_matches('/');
        format!("{}/{}", self.base_origin, relative)
    }
}

impl Default for AssetUrlResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_BASE_ORIGIN)
    }
}

fn is_absolute_http(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
