// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use kuchiki::NodeRef;

use super::ImageMeta;

pub fn is_image_element(node: &NodeRef) -> bool {
    has_local_name(node, "img")
}

fn has_local_name(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|element| (&*element.name.local).eq_ignore_ascii_case(name))
}

/// Reads lightbox details from an `img` element.
///
/// Returns `None` for anything that is not an image with a non-empty `src`.
pub fn extract_image_meta(image: &NodeRef, default_label: &str) -> Option<ImageMeta> {
    if !is_image_element(image) {
        return None;
    }
    let element = image.as_element()?;
    let attributes = element.attributes.borrow();
    let src = attributes.get("src").map(str::trim).unwrap_or_default();
    if src.is_empty() {
        return None;
    }

    let caption = figure_caption(image);
    Some(ImageMeta::from_parts(
        src,
        attributes.get("alt"),
        &caption,
        default_label,
    ))
}

fn figure_caption(image: &NodeRef) -> String {
    image
        .ancestors()
        .find(|ancestor| has_local_name(ancestor, "figure"))
        .and_then(|figure| figure.select_first("figcaption").ok())
        .map(|caption| caption.as_node().text_contents().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchiki::traits::*;

    /// Returns the document with its first image; the document must outlive
    /// the image for ancestor lookups to work.
    fn first_image(html: &str) -> (NodeRef, NodeRef) {
        let document = kuchiki::parse_html().one(html);
        let image = document
            .select_first("img")
            .expect("document has an image")
            .as_node()
            .clone();
        (document, image)
    }

    #[test]
    fn caption_comes_from_enclosing_figure() {
        let (_document, image) = first_image(
            r#"<figure><img src="https://cdn.x/a.png"><figcaption> Caption text </figcaption></figure>"#,
        );
        assert!(image.parent().is_some());
        let meta = extract_image_meta(&image, "Image").expect("meta");
        assert_eq!(meta.src, "https://cdn.x/a.png");
        assert_eq!(meta.caption, "Caption text");
        assert_eq!(meta.alt, "Caption text");
    }

    #[test]
    fn caption_found_through_wrapper_elements() {
        let (_document, image) = first_image(
            r#"<figure><a href="/x"><span><img src="/a.png" alt="Stool"></span></a><figcaption>The <em>royal</em> stool</figcaption></figure>"#,
        );
        let meta = extract_image_meta(&image, "Image").expect("meta");
        assert_eq!(meta.caption, "The royal stool");
        assert_eq!(meta.alt, "Stool");
    }

    #[test]
    fn image_outside_figure_has_no_caption() {
        let (_document, image) =
            first_image(r#"<p><img src="/a.png"></p><figcaption>stray</figcaption>"#);
        let meta = extract_image_meta(&image, "Image").expect("meta");
        assert_eq!(meta.caption, "");
        assert_eq!(meta.alt, "Image");
    }

    #[test]
    fn empty_src_yields_nothing() {
        let (_document, image) = first_image(r#"<img src="" alt="x">"#);
        assert!(extract_image_meta(&image, "Image").is_none());

        let (_document, image) = first_image(r#"<img alt="x">"#);
        assert!(extract_image_meta(&image, "Image").is_none());
    }

    #[test]
    fn non_image_nodes_yield_nothing() {
        let document = kuchiki::parse_html().one("<p>text</p>");
        let paragraph = document.select_first("p").expect("p").as_node().clone();
        assert!(!is_image_element(&paragraph));
        assert!(extract_image_meta(&paragraph, "Image").is_none());
    }
}
