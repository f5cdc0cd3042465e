// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Rendered rich-text region with an image lightbox.
//!
//! The view owns the sanitized markup, a parsed copy of it standing in for the
//! rendered content region, and the lightbox state. All input arrives through
//! [`RichTextView::set_html`] and the single delegated handler
//! [`RichTextView::dispatch`].

use kuchiki::NodeRef;

use crate::sanitize::{
    DEFAULT_IMAGE_LABEL, DomSanitizer, HtmlSanitizer, ImageMeta, extract_image_meta,
    is_image_element, parse_body_fragment,
};
use crate::templates::{
    RichTextViewContext, TemplateEngine, VIEW_TEMPLATE_NAME, render_minijinja_template,
};

pub const DEFAULT_LIGHTBOX_MAX_HEIGHT: &str = "85vh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub default_image_label: String,
    /// CSS length bounding the enlarged image.
    pub lightbox_max_height: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            default_image_label: DEFAULT_IMAGE_LABEL.to_string(),
            lightbox_max_height: DEFAULT_LIGHTBOX_MAX_HEIGHT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open(ImageMeta),
}

impl LightboxState {
    pub fn is_open(&self) -> bool {
        matches!(self, LightboxState::Open(_))
    }

    pub fn image(&self) -> Option<&ImageMeta> {
        match self {
            LightboxState::Open(meta) => Some(meta),
            LightboxState::Closed => None,
        }
    }
}

/// Events delivered to the view by the surrounding page.
#[derive(Debug, Clone, Copy)]
pub enum ViewEvent<'a> {
    /// A click whose event target is the given node.
    Click(&'a NodeRef),
    OverlayClick,
    CloseControl,
}

pub struct RichTextView<S: HtmlSanitizer = DomSanitizer> {
    sanitizer: S,
    options: ViewOptions,
    raw_html: Option<String>,
    sanitized_html: String,
    region: NodeRef,
    lightbox: LightboxState,
    sanitize_passes: usize,
}

impl<S: HtmlSanitizer> RichTextView<S> {
    pub fn new(sanitizer: S, options: ViewOptions) -> Self {
        Self {
            sanitizer,
            options,
            raw_html: None,
            sanitized_html: String::new(),
            region: render_region(""),
            lightbox: LightboxState::Closed,
            sanitize_passes: 0,
        }
    }

    /// Supplies the raw HTML for this render.
    ///
    /// Sanitizes and re-renders only when `raw_html` differs from the previous
    /// input; returns whether that happened. An open lightbox stays open.
    pub fn set_html(&mut self, raw_html: &str) -> bool {
        if self.raw_html.as_deref() == Some(raw_html) {
            return false;
        }

        self.sanitized_html = self.sanitizer.sanitize(raw_html);
        self.region = render_region(&self.sanitized_html);
        self.raw_html = Some(raw_html.to_string());
        self.sanitize_passes += 1;
        log::debug!(
            "Rich text re-rendered: {} raw bytes, {} sanitized bytes",
            raw_html.len(),
            self.sanitized_html.len()
        );
        true
    }

    pub fn sanitized_html(&self) -> &str {
        &self.sanitized_html
    }

    /// Root of the rendered content region.
    pub fn region(&self) -> &NodeRef {
        &self.region
    }

    pub fn lightbox(&self) -> &LightboxState {
        &self.lightbox
    }

    pub fn sanitize_passes(&self) -> usize {
        self.sanitize_passes
    }

    /// Rendered `img` elements in document order.
    pub fn image_nodes(&self) -> Vec<NodeRef> {
        self.region
            .descendants()
            .filter(is_image_element)
            .collect()
    }

    /// Applies an event to the lightbox state machine.
    ///
    /// Returns `true` when the state changed.
    pub fn dispatch(&mut self, event: ViewEvent<'_>) -> bool {
        match event {
            ViewEvent::Click(target) => {
                if self.lightbox.is_open() {
                    return false;
                }
                match self.image_at(target) {
                    Some(meta) => {
                        log::debug!("Opening lightbox for {}", meta.src);
                        self.lightbox = LightboxState::Open(meta);
                        true
                    }
                    None => false,
                }
            }
            ViewEvent::OverlayClick | ViewEvent::CloseControl => {
                if !self.lightbox.is_open() {
                    return false;
                }
                log::debug!("Closing lightbox");
                self.lightbox = LightboxState::Closed;
                true
            }
        }
    }

    /// Finds the nearest image at or above `target`, provided `target` lies
    /// inside the content region.
    fn image_at(&self, target: &NodeRef) -> Option<ImageMeta> {
        let mut image = None;
        for node in target.inclusive_ancestors() {
            if node == self.region {
                return image.and_then(|image: NodeRef| {
                    extract_image_meta(&image, &self.options.default_image_label)
                });
            }
            if image.is_none() && is_image_element(&node) {
                image = Some(node);
            }
        }
        None
    }

    /// Renders the content region and, when open, the lightbox overlay.
    pub fn render(&self, engine: &dyn TemplateEngine) -> Result<String, minijinja::Error> {
        let context = RichTextViewContext::new(
            &self.sanitized_html,
            self.lightbox.image(),
            &self.options.lightbox_max_height,
        );
        render_minijinja_template(engine, VIEW_TEMPLATE_NAME, context.to_value())
    }
}

fn render_region(sanitized_html: &str) -> NodeRef {
    parse_body_fragment(sanitized_html).unwrap_or_else(NodeRef::new_document)
}
