// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{Value, context};

use crate::sanitize::ImageMeta;

/// Values for `rich_text/view.html`.
///
/// `content` must already be sanitized; it is the only value rendered without
/// escaping.
#[derive(Debug, Clone)]
pub struct RichTextViewContext<'a> {
    content: &'a str,
    lightbox: Option<&'a ImageMeta>,
    max_height: &'a str,
}

impl<'a> RichTextViewContext<'a> {
    pub fn new(content: &'a str, lightbox: Option<&'a ImageMeta>, max_height: &'a str) -> Self {
        Self {
            content,
            lightbox,
            max_height,
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            content => Value::from_safe_string(self.content.to_string()),
            lightbox => self.lightbox,
            max_height => self.max_height,
        }
    }
}
