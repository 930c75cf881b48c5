//! Tolerant markup parser.
//!
//! A regex tokenizer feeds a small tree builder that mimics the handful of
//! browser recovery rules editing content actually relies on: void and
//! self-closing elements, implicit `</p>` before a block and `</li>` before a
//! sibling item, stray end tags ignored, unclosed elements closed at EOF.
//! Comments and doctypes are dropped.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::entities::named_entity;
use super::node::{is_block, is_raw_text, is_void, Document, NodeId};

static TAG_RE: OnceLock<Regex> = OnceLock::new();
static ATTR_RE: OnceLock<Regex> = OnceLock::new();
static ENTITY_RE: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(
            r#"<!--[\s\S]*?-->|<![^>]*>|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
        )
        .expect("tag pattern is valid")
    })
}

fn attr_regex() -> &'static Regex {
    ATTR_RE.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute pattern is valid")
    })
}

fn entity_regex() -> &'static Regex {
    ENTITY_RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]*);")
            .expect("entity pattern is valid")
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

impl Document {
    /// Parse a complete document body.
    pub fn parse(markup: &str) -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        parse_into(&mut doc, root, markup);
        doc
    }

    /// Parse `markup` into detached nodes owned by this document.
    ///
    /// Returns the top-level nodes in order; none of them is attached.
    pub fn parse_fragment(&mut self, markup: &str) -> Vec<NodeId> {
        let holder = self.create_element("template", Vec::new());
        parse_into(self, holder, markup);
        let nodes = self.children(holder).to_vec();
        for &node in &nodes {
            self.detach(node);
        }
        nodes
    }
}

/// Decode numeric and named character references.
///
/// Unknown named references are left untouched; the serializer writes them
/// back verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    entity_regex()
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree Builder
// ─────────────────────────────────────────────────────────────────────────────

fn parse_into(doc: &mut Document, container: NodeId, markup: &str) {
    let mut stack = vec![container];
    let mut pos = 0;

    while pos < markup.len() {
        let Some(caps) = tag_regex().captures_at(markup, pos) else {
            push_text(doc, &stack, &markup[pos..]);
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        if whole.start() > pos {
            push_text(doc, &stack, &markup[pos..whole.start()]);
        }
        pos = whole.end();

        // Comments and doctypes carry no name
        let Some(name) = caps.get(2) else {
            continue;
        };
        let tag = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            close_element(doc, &mut stack, &tag);
            continue;
        }

        apply_implicit_closes(doc, &mut stack, &tag);

        let attrs = parse_attributes(caps.get(3).map_or("", |m| m.as_str()));
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
        let element = doc.create_element(&tag, attrs);
        let parent = current(&stack);
        doc.append_child(parent, element);

        if is_void(&tag) || self_closing {
            continue;
        }

        if is_raw_text(&tag) {
            let close = format!("</{}", tag);
            let rest = markup[pos..].to_ascii_lowercase();
            let end = rest.find(&close).map_or(markup.len(), |i| pos + i);
            if end > pos {
                let text = doc.create_text(&markup[pos..end]);
                doc.append_child(element, text);
            }
            pos = markup[end..].find('>').map_or(markup.len(), |i| end + i + 1);
            continue;
        }

        stack.push(element);
    }
}

fn current(stack: &[NodeId]) -> NodeId {
    stack[stack.len() - 1]
}

fn push_text(doc: &mut Document, stack: &[NodeId], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let text = doc.create_text(&decode_entities(raw));
    doc.append_child(current(stack), text);
}

/// Pop back to the innermost open element named `tag`; ignore stray end tags.
fn close_element(doc: &Document, stack: &mut Vec<NodeId>, tag: &str) {
    // Index 0 is the container and is never closed
    if let Some(index) = (1..stack.len())
        .rev()
        .find(|&i| doc.tag(stack[i]) == Some(tag))
    {
        stack.truncate(index);
    }
}

fn apply_implicit_closes(doc: &Document, stack: &mut Vec<NodeId>, tag: &str) {
    if stack.len() < 2 {
        return;
    }
    let top = current(stack);
    let closes_paragraph = is_block(tag) && doc.tag(top) == Some("p");
    let closes_item = tag == "li" && doc.tag(top) == Some("li");
    if closes_paragraph || closes_item {
        stack.pop();
    }
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = Vec::new();
    for caps in attr_regex().captures_iter(raw) {
        let name = caps[1].to_ascii_lowercase();
        if attrs.iter().any(|(k, _)| *k == name) {
            continue;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or(String::new(), |m| decode_entities(m.as_str()));
        attrs.push((name, value));
    }
    attrs
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
