// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use once_cell::sync::Lazy;
use regex::Regex;

/// Elements removed together with their whole subtree.
pub const DENIED_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "form", "input", "button", "textarea",
];

pub const LINK_REL: &str = "noopener noreferrer";

static ALLOWED_URL_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)^(https?:|mailto:|tel:|/|#)"));

static TEXT_ALIGN_REGEX: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*text-align\s*:\s*(left|right|center|justify)\s*$")
});

pub fn is_denied_tag(local_name: &str) -> bool {
    DENIED_TAGS
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(local_name))
}

pub fn is_event_handler_attribute(name: &str) -> bool {
    name.get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

pub fn is_url_attribute(name: &str) -> bool {
    name.eq_ignore_ascii_case("href") || name.eq_ignore_ascii_case("src")
}

/// Empty values are allowed; anything else has to use a known-safe scheme or
/// be root-relative or a fragment.
pub fn is_allowed_url(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    match ALLOWED_URL_REGEX.as_ref() {
        Ok(regex) => regex.is_match(value),
        Err(error) => {
            log::error!("URL scheme pattern failed to compile: {}", error);
            false
        }
    }
}

/// Reduces a `style` attribute to its last valid `text-align` declaration.
///
/// Returns `None` when nothing survives and the attribute should be dropped.
pub fn filter_style(style: &str) -> Option<String> {
    let regex = match TEXT_ALIGN_REGEX.as_ref() {
        Ok(regex) => regex,
        Err(error) => {
            log::error!("text-align pattern failed to compile: {}", error);
            return None;
        }
    };

    style
        .split(';')
        .filter_map(|declaration| regex.captures(declaration))
        .filter_map(|captures| captures.get(1))
        .map(|value| format!("text-align: {}", value.as_str().to_ascii_lowercase()))
        .last()
}

pub fn starts_with_http(value: &str) -> bool {
    value
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"))
}
