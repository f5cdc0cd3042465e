// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![cfg(feature = "dom")]

mod common;

use common::{EDITOR_ARTICLE, attr, attribute_names, cdn_sanitizer, count, parse};
use richtext::assets::AssetUrlResolver;
use richtext::sanitize::{DomSanitizer, HtmlSanitizer, policy};

#[test]
fn script_elements_and_their_text_never_survive() {
    let sanitizer = cdn_sanitizer();
    let inputs = [
        "<script>alert('owned')</script><p>after</p>",
        "<p>before</p><SCRIPT type=\"text/javascript\" src=\"/x.js\">alert('owned')</SCRIPT>",
        "<div><script defer>alert('owned')</script></div>",
        "<p>x</p><script>alert('owned')",
        "<svg><script>alert('owned')</script></svg>",
    ];
    for raw in inputs {
        let html = sanitizer.sanitize(raw);
        assert!(!html.to_ascii_lowercase().contains("<script"), "{raw:?} -> {html:?}");
        assert!(!html.contains("alert('owned')"), "{raw:?} -> {html:?}");
    }
}

#[test]
fn every_denied_tag_is_removed() {
    let sanitizer = cdn_sanitizer();
    for tag in policy::DENIED_TAGS {
        let raw = format!("<p>keep</p><div><{tag}>payload</{tag}></div>");
        let html = sanitizer.sanitize(&raw);
        let document = parse(&html);
        assert_eq!(count(&document, tag), 0, "{tag} survived: {html}");
        assert!(html.contains("keep"));
    }
}

#[test]
fn event_handlers_are_removed_but_safe_attributes_stay() {
    let html = cdn_sanitizer().sanitize(
        r#"<img id="pic" src="/a.png" alt="Chief" onerror="x()" onload="y()">
<p class="lead" title="Intro" onclick="z()" onmouseenter="w()">hi</p>"#,
    );
    let document = parse(&html);
    let names = attribute_names(&document);
    assert!(names.iter().all(|name| !name.starts_with("on")), "{names:?}");
    assert_eq!(attr(&document, "#pic", "alt").as_deref(), Some("Chief"));
    assert_eq!(attr(&document, "p", "class").as_deref(), Some("lead"));
    assert_eq!(attr(&document, "p", "title").as_deref(), Some("Intro"));
}

#[test]
fn javascript_links_lose_href_and_https_links_open_in_new_tab() {
    let html = cdn_sanitizer().sanitize(
        r#"<a id="bad" href="javascript:alert(1)">bad</a><a id="good" href="https://example.com">good</a>"#,
    );
    let document = parse(&html);

    assert_eq!(attr(&document, "#bad", "href"), None);
    assert_eq!(
        attr(&document, "#bad", "rel").as_deref(),
        Some("noopener noreferrer")
    );
    assert_eq!(attr(&document, "#bad", "target"), None);

    assert_eq!(
        attr(&document, "#good", "href").as_deref(),
        Some("https://example.com")
    );
    assert_eq!(
        attr(&document, "#good", "rel").as_deref(),
        Some("noopener noreferrer")
    );
    assert_eq!(attr(&document, "#good", "target").as_deref(), Some("_blank"));
}

#[test]
fn root_relative_image_is_resolved_once() {
    let sanitizer = cdn_sanitizer();
    let first = sanitizer.sanitize(r#"<img src="/uploads/a.png">"#);
    assert_eq!(
        attr(&parse(&first), "img", "src").as_deref(),
        Some("https://cdn.example/uploads/a.png")
    );

    let second = sanitizer.sanitize(&first);
    assert_eq!(second, first);
    assert_eq!(
        attr(&parse(&second), "img", "src").as_deref(),
        Some("https://cdn.example/uploads/a.png")
    );
}

#[test]
fn style_is_reduced_to_text_align_or_removed() {
    let html = cdn_sanitizer()
        .sanitize(r#"<p id="a" style="text-align:center; color:red">a</p><p id="b" style="color:red">b</p>"#);
    assert!(html.contains(r#"style="text-align: center""#));
    let document = parse(&html);
    assert_eq!(
        attr(&document, "#a", "style").as_deref(),
        Some("text-align: center")
    );
    assert_eq!(attr(&document, "#b", "style"), None);
}

#[test]
fn sanitizing_is_idempotent_for_editor_content() {
    let sanitizer = cdn_sanitizer();
    let once = sanitizer.sanitize(EDITOR_ARTICLE);
    let twice = sanitizer.sanitize(&once);
    assert_eq!(once, twice);
}

#[test]
fn sanitizing_is_idempotent_when_leading_content_is_removed() {
    let sanitizer = cdn_sanitizer();
    let trailers = [
        "\n<p>a</p>",
        "<title>T</title><p>b</p>",
        "<meta name=\"k\" content=\"v\"><p>c</p>",
        "  \n\t<figure><img src=\"/uploads/a.png\"><figcaption>d</figcaption></figure>",
    ];
    for tag in policy::DENIED_TAGS {
        for trailer in trailers {
            let raw = format!("<{tag} src=\"https://video.example/embed\">x</{tag}>{trailer}");
            let once = sanitizer.sanitize(&raw);
            assert_eq!(sanitizer.sanitize(&once), once, "not idempotent for {raw:?}");
        }
    }
}

#[test]
fn leading_whitespace_survives_removed_embed() {
    let html = cdn_sanitizer()
        .sanitize("<iframe src=\"https://video.example/embed\"></iframe>\n<p>a</p>");
    assert_eq!(html, "\n<p>a</p>");
}

#[test]
fn editor_content_keeps_its_structure() {
    let html = cdn_sanitizer().sanitize(EDITOR_ARTICLE);
    let document = parse(&html);

    assert_eq!(count(&document, "h2"), 1);
    assert_eq!(count(&document, "figure figcaption"), 1);
    assert_eq!(count(&document, "li"), 2);
    assert_eq!(count(&document, "iframe"), 0);
    assert!(!html.contains("document.cookie"));
    assert!(!html.contains("steal()"));

    assert_eq!(
        attr(&document, "h2", "style").as_deref(),
        Some("text-align: center")
    );
    assert_eq!(
        attr(&document, "figure img", "src").as_deref(),
        Some("https://cdn.example/uploads/posuban.jpg")
    );
    assert_eq!(attr(&document, "figure img", "loading").as_deref(), Some("lazy"));
    assert_eq!(attr(&document, "figure img", "decoding").as_deref(), Some("async"));
    assert_eq!(
        attr(&document, "a[href^=\"mailto:\"]", "target"),
        None
    );
    assert_eq!(
        attr(&document, "a[href=\"/clans/7\"]", "rel").as_deref(),
        Some("noopener noreferrer")
    );
}

#[test]
fn absolute_image_urls_are_not_rewritten() {
    let html = cdn_sanitizer().sanitize(r#"<img src="http://x.com/a.png">"#);
    assert_eq!(
        attr(&parse(&html), "img", "src").as_deref(),
        Some("http://x.com/a.png")
    );
}

#[test]
fn resolver_edge_cases() {
    let resolver = AssetUrlResolver::new("https://cdn.x/");
    assert_eq!(resolver.resolve(""), "");
    assert_eq!(resolver.resolve("http://x.com/a.png"), "http://x.com/a.png");
    assert_eq!(resolver.resolve("a.png"), "https://cdn.x/a.png");
}

#[test]
fn garbage_input_never_panics() {
    let sanitizer = DomSanitizer::new(AssetUrlResolver::default());
    let inputs = [
        "",
        "<",
        "<<<>>>",
        "</p></div></body></html>",
        "<!DOCTYPE html><html><head><title>x</title></head><body><p>ok</p></body></html>",
        "<table><tr><td>cell<td>cell2</table>",
        "<a href='https://x'><a href='/y'>nested</a></a>",
        "\u{0}\u{fffd}<p>\u{0}</p>",
        "<img src=/uploads/a.png onerror=alert(1)>",
    ];
    for raw in inputs {
        let html = sanitizer.sanitize(raw);
        assert!(!html.contains("onerror"));
        assert_eq!(sanitizer.sanitize(&html), html, "not idempotent for {raw:?}");
    }
}
