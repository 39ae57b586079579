//! Text normalizer: turns a raw (HTML or plain-text) email into newline-separated,
//! whitespace-collapsed lines that the field patterns run against.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{node::Node, ElementRef, Html};

/// Any start, end or declaration tag (`<p>`, `</o:p>`, `<!DOCTYPE html>`).
/// A tag never contains `@`, so angle-bracketed addresses such as
/// `<jane@example.com>` stay plain text.
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/?\s*!?[a-z][a-z0-9:-]*(?:\s[^<>@]*)?/?\s*>")
        .expect("valid html tag regex")
});

const SKIP_TAGS: &[&str] = &["head", "script", "style", "noscript", "template", "title"];

const BLOCK_TAGS: &[&str] = &[
    "html", "body", "p", "div", "br", "hr", "table", "thead", "tbody", "tfoot", "tr", "td", "th",
    "ul", "ol", "li", "dl", "dt", "dd", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre",
    "section", "article", "header", "footer", "center", "form", "address",
];

/// Builds the text a parse runs against: optional `Subject:` and `From:` lines,
/// then the body with any markup stripped, cleaned line by line.
pub fn normalize(subject: Option<&str>, sender: Option<&str>, body: &str) -> String {
    let mut text = String::with_capacity(body.len() + 64);

    if let Some(subject) = subject {
        text.push_str("Subject: ");
        text.push_str(subject);
        text.push('\n');
    }
    if let Some(sender) = sender {
        text.push_str("From: ");
        text.push_str(sender);
        text.push('\n');
    }

    if looks_like_html(body) {
        let visible = html_to_text(body);
        if visible.trim().is_empty() {
            tracing::debug!("markup holds no visible text; body contributes nothing");
        }
        text.push_str(&visible);
    } else {
        text.push_str(body);
    }

    clean_text(&text)
}

/// Unifies line terminators, collapses whitespace runs inside each line,
/// trims every line and drops the ones left empty.
pub fn clean_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    unified
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn looks_like_html(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("<html") || lower.contains("<body") || HTML_TAG.is_match(body)
}

/// Visible text of an HTML document with block boundaries kept as newlines.
/// Attribute values and skipped elements never reach the output.
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::with_capacity(html.len());
    collect_text(document.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIP_TAGS.contains(&name) {
        return;
    }

    let is_block = BLOCK_TAGS.contains(&name);
    if is_block {
        out.push('\n');
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }

    if is_block {
        out.push('\n');
    }
}
