// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Sanitization of untrusted rich-text HTML.
//!
//! [`HtmlSanitizer`] is the capability callers depend on. Builds with the
//! `dom` feature get [`DomSanitizer`], which parses the input with html5ever
//! and rewrites the tree. Builds without a parser get [`NullSanitizer`], which
//! renders nothing rather than passing raw input through.

#[cfg(feature = "dom")]
mod dom;
#[cfg(feature = "dom")]
pub(crate) mod image;
pub mod policy;

use serde::Serialize;

use crate::assets::AssetUrlResolver;

#[cfg(feature = "dom")]
pub use dom::DomSanitizer;
#[cfg(feature = "dom")]
pub(crate) use dom::parse_body_fragment;
#[cfg(feature = "dom")]
pub use image::{extract_image_meta, is_image_element};

/// Label used for images that carry neither `alt` text nor a caption.
pub const DEFAULT_IMAGE_LABEL: &str = "Image";

pub trait HtmlSanitizer: Send + Sync {
    /// Returns the sanitized inner HTML of `raw_html`.
    fn sanitize(&self, raw_html: &str) -> String;
}

impl<T: HtmlSanitizer + ?Sized> HtmlSanitizer for Box<T> {
    fn sanitize(&self, raw_html: &str) -> String {
        (**self).sanitize(raw_html)
    }
}

/// Sanitizer for builds without an HTML parser. Always returns empty output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSanitizer;

impl HtmlSanitizer for NullSanitizer {
    fn sanitize(&self, raw_html: &str) -> String {
        if !raw_html.is_empty() {
            log::debug!(
                "No HTML parser available; dropping {} bytes of rich text",
                raw_html.len()
            );
        }
        String::new()
    }
}

/// Image details shown by the lightbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMeta {
    pub src: String,
    pub alt: String,
    pub caption: String,
}

impl ImageMeta {
    /// Builds the meta from raw attribute values, applying the `alt` fallback
    /// chain: alt text, then caption, then `default_label`.
    pub fn from_parts(
        src: &str,
        alt: Option<&str>,
        caption: &str,
        default_label: &str,
    ) -> Self {
        let caption = caption.trim().to_string();
        let alt = match alt.map(str::trim) {
            Some(alt) if !alt.is_empty() => alt.to_string(),
            _ if !caption.is_empty() => caption.clone(),
            _ => default_label.to_string(),
        };
        Self {
            src: src.to_string(),
            alt,
            caption,
        }
    }
}

/// Sanitized HTML together with the images found while sanitizing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizedFragment {
    pub html: String,
    pub images: Vec<ImageMeta>,
}

/// Picks the best sanitizer this build supports.
#[cfg(feature = "dom")]
pub fn default_sanitizer(
    resolver: AssetUrlResolver,
    default_image_label: &str,
) -> Box<dyn HtmlSanitizer> {
    Box::new(DomSanitizer::new(resolver).with_default_image_label(default_image_label))
}

#[cfg(not(feature = "dom"))]
pub fn default_sanitizer(
    _resolver: AssetUrlResolver,
    _default_image_label: &str,
) -> Box<dyn HtmlSanitizer> {
    log::warn!("Built without the `dom` feature; rich text will render empty");
    Box::new(NullSanitizer)
}
