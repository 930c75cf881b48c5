//! Active-content stripping for the preview view.

use log::debug;

use crate::markup::{Document, NodeId};

/// Elements removed together with their content.
const BLOCKED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "frame", "frameset", "applet", "base", "meta",
    "link",
];

/// Attributes holding a URL.
const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "formaction", "xlink:href", "poster"];

/// Whether a URL attribute value would execute script when followed.
fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("javascript:")
        || compact.starts_with("vbscript:")
        || compact.starts_with("data:text/html")
}

/// Remove scripts, event handlers and script URLs from a markup string.
///
/// The result is canonical markup; the input is never modified.
pub fn sanitize_markup(markup: &str) -> String {
    let mut doc = Document::parse(markup);
    let root = doc.root();
    let mut removed = 0usize;

    let blocked: Vec<NodeId> = doc
        .descendants(root)
        .into_iter()
        .filter(|&n| doc.has_tag(n, BLOCKED_ELEMENTS))
        .collect();
    for node in blocked {
        doc.detach(node);
        removed += 1;
    }

    for node in doc.descendants(root) {
        let Some(element) = doc.element(node) else {
            continue;
        };
        let unsafe_attrs: Vec<String> = element
            .attrs
            .iter()
            .filter(|(name, value)| {
                name.starts_with("on")
                    || (URL_ATTRIBUTES.contains(&name.as_str()) && is_script_url(value))
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in unsafe_attrs {
            doc.remove_attr(node, &name);
            removed += 1;
        }
    }

    if removed > 0 {
        debug!("Preview sanitizer removed {} item(s)", removed);
    }
    doc.to_markup()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_markup_is_untouched() {
        let markup =
            "<p>Hello <a href=\"https://example.com\">link</a><img src=\"x.png\" alt=\"x\"></p>";
        assert_eq!(sanitize_markup(markup), markup);
    }

    #[test]
    fn test_strips_blocked_elements() {
        assert_eq!(
            sanitize_markup("<p>a</p><script>alert(1)</script><iframe src=\"e\"></iframe><p>b</p>"),
            "<p>a</p><p>b</p>"
        );
    }

    #[test]
    fn test_strips_event_handlers() {
        assert_eq!(
            sanitize_markup("<img src=\"x.png\" onerror=\"alert(1)\" onLoad=\"x()\">"),
            "<img src=\"x.png\">"
        );
    }

    #[test]
    fn test_strips_script_urls() {
        assert_eq!(
            sanitize_markup("<a href=\" java\tscript:alert(1)\">x</a><a href=\"VBScript:y\">y</a>"),
            "<a>x</a><a>y</a>"
        );
    }

    #[test]
    fn test_is_script_url() {
        assert!(is_script_url("javascript:void(0)"));
        assert!(is_script_url("data:text/html;base64,AAAA"));
        assert!(!is_script_url("https://example.com/javascript:"));
        assert!(!is_script_url("data:image/png;base64,AAAA"));
    }
}
