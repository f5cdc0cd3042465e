// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::traits::*;
use kuchiki::{ElementData, ExpandedName, NodeRef};

use super::image::{extract_image_meta, is_image_element};
use super::policy::{self, LINK_REL};
use super::{DEFAULT_IMAGE_LABEL, HtmlSanitizer, SanitizedFragment};
use crate::assets::AssetUrlResolver;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Tree-based sanitizer backed by the html5ever parser.
///
/// Parsing is inert: nothing is executed or fetched while building the tree.
#[derive(Debug, Clone)]
pub struct DomSanitizer {
    resolver: AssetUrlResolver,
    default_image_label: String,
}

#[derive(Debug, Default)]
struct Removed {
    elements: usize,
    attributes: usize,
}

impl DomSanitizer {
    pub fn new(resolver: AssetUrlResolver) -> Self {
        Self {
            resolver,
            default_image_label: DEFAULT_IMAGE_LABEL.to_string(),
        }
    }

    pub fn with_default_image_label(mut self, label: &str) -> Self {
        self.default_image_label = label.to_string();
        self
    }

    /// Sanitizes `raw_html` and collects the lightbox details of every image
    /// that kept a usable `src`.
    pub fn sanitize_fragment(&self, raw_html: &str) -> SanitizedFragment {
        let Some(body) = self.sanitize_tree(raw_html) else {
            return SanitizedFragment::default();
        };

        let images = body
            .descendants()
            .filter(is_image_element)
            .filter_map(|image| extract_image_meta(&image, &self.default_image_label))
            .collect();

        SanitizedFragment {
            html: serialize_children(&body),
            images,
        }
    }

    /// Parses and cleans `raw_html`, returning the fragment root whose
    /// children are the sanitized content.
    pub(crate) fn sanitize_tree(&self, raw_html: &str) -> Option<NodeRef> {
        let Some(body) = parse_body_fragment(raw_html) else {
            log::warn!("Parsed rich text has no root element; rendering nothing");
            return None;
        };

        let removed = self.clean_subtree(&body);
        if removed.elements > 0 || removed.attributes > 0 {
            log::debug!(
                "Sanitized rich text: removed {} elements and {} attributes",
                removed.elements,
                removed.attributes
            );
        }
        Some(body)
    }

    fn clean_subtree(&self, root: &NodeRef) -> Removed {
        let mut removed = Removed::default();
        let mut pending = vec![root.clone()];

        while let Some(parent) = pending.pop() {
            let children: Vec<NodeRef> = parent.children().collect();
            for child in children {
                if child.as_comment().is_some() {
                    child.detach();
                    continue;
                }
                let Some(element) = child.as_element() else {
                    continue;
                };
                if policy::is_denied_tag(&element.name.local) {
                    log::trace!("Removing <{}> element", &*element.name.local);
                    removed.elements += 1;
                    child.detach();
                    continue;
                }

                removed.attributes += clean_attributes(element);
                self.apply_fixups(element);
                pending.push(child.clone());
            }
        }

        removed
    }

    fn apply_fixups(&self, element: &ElementData) {
        let tag = element.name.local.to_ascii_lowercase().to_string();
        let mut attributes = element.attributes.borrow_mut();
        match tag.as_str() {
            "a" => {
                attributes.insert("rel", LINK_REL.to_string());
                let external = attributes
                    .get("href")
                    .is_some_and(policy::starts_with_http);
                if external {
                    attributes.insert("target", "_blank".to_string());
                }
            }
            "img" => {
                attributes.insert("loading", "lazy".to_string());
                attributes.insert("decoding", "async".to_string());
                if let Some(src) = attributes.get("src").map(str::to_string) {
                    attributes.insert("src", self.resolver.resolve(&src));
                }
            }
            _ => {}
        }
    }
}

impl HtmlSanitizer for DomSanitizer {
    fn sanitize(&self, raw_html: &str) -> String {
        self.sanitize_tree(raw_html)
            .map(|body| serialize_children(&body))
            .unwrap_or_default()
    }
}

/// Parses `html` as the contents of a `<body>` element.
///
/// Returns the fragment's root `html` element, whose children are the parsed
/// nodes. Leading whitespace, `title` and `meta` stay where they were written.
pub(crate) fn parse_body_fragment(html: &str) -> Option<NodeRef> {
    let context = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("body"));
    let document = kuchiki::parse_fragment(context, Vec::new()).one(html);
    document
        .children()
        .find(|child| child.as_element().is_some())
}

/// Strips event handlers, unsafe URLs and non-alignment styles.
/// Returns how many attributes were dropped.
fn clean_attributes(element: &ElementData) -> usize {
    let mut attributes = element.attributes.borrow_mut();
    let names: Vec<ExpandedName> = attributes.map.keys().cloned().collect();
    let mut dropped = 0;

    for name in names {
        let local: &str = &name.local;

        if policy::is_event_handler_attribute(local) {
            attributes.map.remove(&name);
            dropped += 1;
            continue;
        }

        if policy::is_url_attribute(local) {
            let allowed = attributes
                .map
                .get(&name)
                .is_some_and(|attribute| policy::is_allowed_url(&attribute.value));
            if !allowed {
                log::trace!("Removing unsafe {} attribute", local);
                attributes.map.remove(&name);
                dropped += 1;
            }
            continue;
        }

        if local.eq_ignore_ascii_case("style") {
            let filtered = attributes
                .map
                .get(&name)
                .and_then(|attribute| policy::filter_style(&attribute.value));
            match filtered {
                Some(style) => {
                    if let Some(attribute) = attributes.map.get_mut(&name) {
                        attribute.value = style;
                    }
                }
                None => {
                    attributes.map.remove(&name);
                    dropped += 1;
                }
            }
        }
    }

    dropped
}

fn serialize_children(node: &NodeRef) -> String {
    let mut output = Vec::new();
    for child in node.children() {
        if let Err(error) = child.serialize(&mut output) {
            log::warn!("Failed to serialize sanitized rich text: {}", error);
            return String::new();
        }
    }
    match String::from_utf8(output) {
        Ok(html) => html,
        Err(error) => {
            log::warn!("Sanitized rich text is not valid UTF-8: {}", error);
            String::new()
        }
    }
}
