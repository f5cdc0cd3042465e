// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use kuchiki::NodeRef;
use kuchiki::traits::*;
use richtext::assets::AssetUrlResolver;
use richtext::sanitize::DomSanitizer;

pub const CDN_ORIGIN: &str = "https://cdn.example";

pub fn cdn_sanitizer() -> DomSanitizer {
    DomSanitizer::new(AssetUrlResolver::new(CDN_ORIGIN))
}

/// Parses sanitized output so assertions do not depend on attribute order.
pub fn parse(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

pub fn attr(document: &NodeRef, selector: &str, name: &str) -> Option<String> {
    let element = document.select_first(selector).ok()?;
    let attributes = element.attributes.borrow();
    attributes.get(name).map(str::to_string)
}

pub fn count(document: &NodeRef, selector: &str) -> usize {
    document
        .select(selector)
        .map(|matches| matches.count())
        .unwrap_or(0)
}

/// Every attribute name present anywhere in `document`.
pub fn attribute_names(document: &NodeRef) -> Vec<String> {
    document
        .descendants()
        .filter_map(|node| {
            node.as_element().map(|element| {
                element
                    .attributes
                    .borrow()
                    .map
                    .keys()
                    .map(|name| name.local.to_string())
                    .collect::<Vec<_>>()
            })
        })
        .flatten()
        .collect()
}

/// Rich text the way the content editor produces it.
pub const EDITOR_ARTICLE: &str = r#"<h2 style="text-align:center; font-weight:bold">Asafo Company No. 7</h2>
<p style="text-align: justify">Founded in the 18th century, the company
<a href="https://example.org/asafo">defended the town</a> and keeps its
<a href="/clans/7">shrine</a>.</p>
<figure class="image"><img src="/uploads/posuban.jpg" alt="" onerror="alert(1)"><figcaption>The posuban shrine</figcaption></figure>
<ul><li>Flag: <em>red</em></li><li>Contact: <a href="mailto:elders@example.org">elders</a></li></ul>
<script>document.cookie</script>
<iframe src="https://video.example/embed/1"></iframe>
<p><a href="javascript:void(0)" onclick="steal()">Read more</a></p>"#;
