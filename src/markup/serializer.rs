//! Canonical markup serialization.
//!
//! Output uses lowercase names, double-quoted attributes and minimal escaping,
//! so serializing a freshly parsed canonical document returns the input.

use super::entities::is_unknown_reference;
use super::node::{is_raw_text, is_void, Document, NodeId, NodeKind};

/// Escape text content.
///
/// An `&` that starts an unknown named reference is kept as-is, since the
/// parser left that reference undecoded.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '&' if is_unknown_reference(&text[i + 1..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for use inside double quotes.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        match c {
            '&' if is_unknown_reference(&value[i + 1..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

impl Document {
    /// Serialize the whole document (the root's children).
    pub fn to_markup(&self) -> String {
        self.inner_markup(self.root())
    }

    /// Serialize the children of `id`.
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        let raw = self.tag(id).is_some_and(is_raw_text);
        for &child in self.children(id) {
            self.write_node(child, raw, &mut out);
        }
        out
    }

    /// Serialize `id` including its own tags.
    pub fn outer_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        let raw = self
            .parent(id)
            .and_then(|p| self.tag(p))
            .is_some_and(is_raw_text);
        self.write_node(id, raw, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, raw_parent: bool, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => {
                if raw_parent {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            Some(NodeKind::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if is_void(&el.tag) {
                    return;
                }
                let raw = is_raw_text(&el.tag);
                for &child in self.children(id) {
                    self.write_node(child, raw, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            Some(NodeKind::Root) => {
                for &child in self.children(id) {
                    self.write_node(child, false, out);
                }
            }
            None => {}
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_markup_is_identity() {
        let samples = [
            "",
            "<p>Hello <b>bold</b> &amp; <i>it</i></p>",
            "<h2 style=\"text-align: center\">Title</h2><ul><li>a</li><li>b</li></ul>",
            "<p>a<br>b<img src=\"x.jpg\" alt=\"\"></p>",
            "<blockquote><p>quoted</p></blockquote><pre>  keep   spaces\n</pre>",
            "<p>caf\u{e9} &lt;tag&gt; 你好 🎉&nbsp;</p>",
        ];
        for sample in samples {
            assert_eq!(Document::parse(sample).to_markup(), sample);
        }
    }

    #[test]
    fn test_normalizes_non_canonical_input() {
        let doc = Document::parse("<P CLASS=x>a</P><img src='y.png'/>");
        assert_eq!(doc.to_markup(), "<p class=\"x\">a</p><img src=\"y.png\">");
    }

    #[test]
    fn test_named_references_survive_reserialization() {
        let doc = Document::parse("<p>a&hellip; &copy; &eacute;t&eacute;&mdash;ok</p>");
        let markup = doc.to_markup();
        assert_eq!(markup, "<p>a… © été—ok</p>");
        assert_eq!(Document::parse(&markup).to_markup(), markup);
    }

    #[test]
    fn test_unknown_references_kept_verbatim() {
        let samples = [
            "<p>&zwsp; &amp;hellip; AT&amp;T x</p>",
            "<a title=\"&zwsp;&amp;copy;\">t</a>",
        ];
        for sample in samples {
            assert_eq!(Document::parse(sample).to_markup(), sample);
        }
    }

    #[test]
    fn test_attribute_escaping() {
        let mut doc = Document::new();
        let a = doc.create_element("a", vec![("title".into(), "say \"hi\" & go".into())]);
        doc.append_child(doc.root(), a);
        assert_eq!(doc.to_markup(), "<a title=\"say &quot;hi&quot; &amp; go\"></a>");
    }

    #[test]
    fn test_raw_text_not_escaped() {
        let markup = "<style>p > b { color: red; }</style>";
        assert_eq!(Document::parse(markup).to_markup(), markup);
    }

    #[test]
    fn test_outer_markup() {
        let doc = Document::parse("<p>x<b>y</b></p>");
        let p = doc.children(doc.root())[0];
        let b = doc.children(p)[1];
        assert_eq!(doc.outer_markup(b), "<b>y</b>");
        assert_eq!(doc.inner_markup(p), "x<b>y</b>");
    }
}
