//! Built-in formatter
//!
//! Every command, implemented directly on the surface tree. This is what
//! `BuiltinHost::exec` runs in place of a platform's native command facility.
//!
//! # Supported Formatting
//! - **Character styles** toggle: if every selected run is already styled the
//!   style is removed, otherwise the unstyled runs are wrapped.
//! - **Value styles** (font size, colors) update an existing wrapper in place
//!   after isolating the run, or wrap it.
//! - **Blocks**: block type, alignment and lists act on every text block the
//!   selection touches. Root-level inline content is given a paragraph first.

use log::debug;

use super::command::{Alignment, Command};
use crate::error::{Error, Result};
use crate::markup::{Document, NodeId};
use crate::surface::Surface;

pub(crate) const BOLD: &[&str] = &["b", "strong"];
pub(crate) const ITALIC: &[&str] = &["i", "em"];
pub(crate) const UNDERLINE: &[&str] = &["u"];
pub(crate) const STRIKE: &[&str] = &["s", "strike", "del"];

/// Inline elements `removeFormat` strips.
const INLINE_FORMATTING: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "strike", "del", "font", "span", "sub", "sup",
];

/// Apply `command` to the surface's live selection.
pub(crate) fn apply(surface: &mut Surface, command: &Command) -> Result<()> {
    if !surface.has_selection() {
        return Err(Error::NoSelection);
    }
    match command {
        Command::Bold => toggle_inline(surface, "b", BOLD),
        Command::Italic => toggle_inline(surface, "i", ITALIC),
        Command::Underline => toggle_inline(surface, "u", UNDERLINE),
        Command::StrikeThrough => toggle_inline(surface, "s", STRIKE),
        Command::FormatBlock(tag) => format_block(surface, tag),
        Command::FontSize(size) => apply_value_style(surface, ValueStyle::FontSize(*size)),
        Command::ForeColor(color) => apply_value_style(surface, ValueStyle::Color(color)),
        Command::BackColor(color) => apply_value_style(surface, ValueStyle::Background(color)),
        Command::Justify(alignment) => justify(surface, *alignment),
        Command::InsertOrderedList => toggle_list(surface, "ol"),
        Command::InsertUnorderedList => toggle_list(surface, "ul"),
        Command::RemoveFormat => remove_format(surface),
        Command::Unlink => unlink(surface),
    }
    debug!("Applied '{}'", command.name());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Character Styles
// ─────────────────────────────────────────────────────────────────────────────

fn toggle_inline(surface: &mut Surface, tag: &str, family: &[&str]) {
    let nodes = surface.selected_text_nodes();
    if nodes.is_empty() {
        return;
    }
    let styled = nodes
        .iter()
        .all(|&t| !surface.inline_ancestors(t, family).is_empty());
    if styled {
        for &t in &nodes {
            strip_ancestors(surface, t, family);
        }
    } else {
        for &t in &nodes {
            if surface.inline_ancestors(t, family).is_empty() {
                surface.doc_mut().wrap(t, tag, Vec::new());
            }
        }
    }
    normalize_around(surface, &nodes);
}

/// Remove every inline ancestor of `text` carrying one of `tags`, splitting
/// each around `text` first so neighbouring content keeps its styling.
fn strip_ancestors(surface: &mut Surface, text: NodeId, tags: &[&str]) {
    for ancestor in surface.inline_ancestors(text, tags) {
        surface.isolate(ancestor, text);
        surface.unwrap_element(ancestor);
    }
}

/// Normalize the blocks holding `nodes`.
fn normalize_around(surface: &mut Surface, nodes: &[NodeId]) {
    let root = surface.document().root();
    let mut scopes: Vec<NodeId> = Vec::new();
    for &node in nodes {
        let scope = surface.nearest_block(node).unwrap_or(root);
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    for scope in scopes {
        if surface.document().is_attached(scope) {
            surface.normalize(scope);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value Styles
// ─────────────────────────────────────────────────────────────────────────────

enum ValueStyle<'a> {
    FontSize(u8),
    Color(&'a str),
    Background(&'a str),
}

impl ValueStyle<'_> {
    fn tag(&self) -> &'static str {
        match self {
            ValueStyle::FontSize(_) | ValueStyle::Color(_) => "font",
            ValueStyle::Background(_) => "span",
        }
    }

    fn is_set_on(&self, doc: &Document, el: NodeId) -> bool {
        match self {
            ValueStyle::FontSize(_) => doc.attr(el, "size").is_some(),
            ValueStyle::Color(_) => doc.attr(el, "color").is_some(),
            ValueStyle::Background(_) => doc.style_property(el, "background-color").is_some(),
        }
    }

    fn set_on(&self, doc: &mut Document, el: NodeId) {
        match self {
            ValueStyle::FontSize(size) => doc.set_attr(el, "size", &size.to_string()),
            ValueStyle::Color(color) => doc.set_attr(el, "color", color),
            ValueStyle::Background(color) => doc.set_style_property(el, "background-color", color),
        }
    }
}

fn apply_value_style(surface: &mut Surface, style: ValueStyle<'_>) {
    let nodes = surface.selected_text_nodes();
    for &t in &nodes {
        let existing = surface
            .inline_ancestors(t, &[style.tag()])
            .into_iter()
            .find(|&el| style.is_set_on(surface.document(), el));
        let target = match existing {
            Some(el) => {
                surface.isolate(el, t);
                el
            }
            None => surface.doc_mut().wrap(t, style.tag(), Vec::new()),
        };
        style.set_on(surface.doc_mut(), target);
    }
    normalize_around(surface, &nodes);
}

// ─────────────────────────────────────────────────────────────────────────────
// Blocks
// ─────────────────────────────────────────────────────────────────────────────

/// Text blocks touched by the selection, creating a paragraph around
/// root-level inline content at either endpoint.
fn target_blocks(surface: &mut Surface) -> Vec<NodeId> {
    if let Some(start) = surface.selection().map(|r| r.start()) {
        surface.ensure_block(start);
    }
    if let Some(end) = surface.selection().map(|r| r.end()) {
        surface.ensure_block(end);
    }
    surface.selected_blocks()
}

fn format_block(surface: &mut Surface, tag: &str) {
    for block in target_blocks(surface) {
        let doc = surface.doc_mut();
        if doc.tag(block) == Some(tag) {
            continue;
        }
        if doc.has_tag(block, &["li"]) {
            let inner = doc.create_element(tag, Vec::new());
            for child in doc.children(block).to_vec() {
                doc.append_child(inner, child);
            }
            doc.append_child(block, inner);
        } else {
            doc.rename(block, tag);
        }
    }
    surface.touch();
}

fn justify(surface: &mut Surface, alignment: Alignment) {
    for block in target_blocks(surface) {
        surface
            .doc_mut()
            .set_style_property(block, "text-align", alignment.css_value());
    }
    surface.touch();
}

/// Create, switch or lift a list over the touched blocks.
fn toggle_list(surface: &mut Surface, list_tag: &str) {
    let blocks = target_blocks(surface);
    if blocks.is_empty() {
        return;
    }
    let in_list = |doc: &Document, block: NodeId| {
        doc.has_tag(block, &["li"])
            && doc
                .parent(block)
                .is_some_and(|list| doc.has_tag(list, &[list_tag]))
    };
    if blocks.iter().all(|&b| in_list(surface.document(), b)) {
        for &item in &blocks {
            lift_item(surface, item);
        }
        surface.touch();
        return;
    }

    let mut current: Option<NodeId> = None;
    for &block in &blocks {
        let doc = surface.doc_mut();
        if doc.has_tag(block, &["li"]) {
            if let Some(list) = doc.parent(block).filter(|&p| doc.has_tag(p, &["ul", "ol"])) {
                doc.rename(list, list_tag);
            }
            current = None;
            continue;
        }
        let item = if doc.has_tag(block, &["p", "div"]) {
            doc.rename(block, "li");
            block
        } else {
            doc.wrap(block, "li", Vec::new())
        };
        match current.filter(|&list| doc.next_sibling(list) == Some(item)) {
            Some(list) => doc.append_child(list, item),
            None => current = Some(doc.wrap(item, list_tag, Vec::new())),
        }
    }
    surface.touch();
}

/// Turn a list item back into a paragraph outside its list.
fn lift_item(surface: &mut Surface, item: NodeId) {
    let Some(list) = surface.document().parent(item) else {
        return;
    };
    surface.isolate(list, item);
    surface.doc_mut().rename(item, "p");
    surface.unwrap_element(list);
}

// ─────────────────────────────────────────────────────────────────────────────
// Removal
// ─────────────────────────────────────────────────────────────────────────────

fn remove_format(surface: &mut Surface) {
    let nodes = surface.selected_text_nodes();
    for &t in &nodes {
        strip_ancestors(surface, t, INLINE_FORMATTING);
    }
    normalize_around(surface, &nodes);
}

/// Remove every link the selection touches. A caret inside a link removes
/// that whole link.
fn unlink(surface: &mut Surface) {
    let mut nodes = surface.selected_text_nodes();
    let mut anchors: Vec<NodeId> = Vec::new();
    if nodes.is_empty() {
        if let Some(start) = surface.selection().map(|r| r.start()) {
            anchors.extend(surface.inline_ancestors(start.node, &["a"]));
            nodes.push(start.node);
        }
    }
    for &t in &nodes {
        for anchor in surface.inline_ancestors(t, &["a"]) {
            if !anchors.contains(&anchor) {
                anchors.push(anchor);
            }
        }
    }
    for anchor in anchors {
        surface.unwrap_element(anchor);
    }
    nodes.retain(|&n| surface.document().is_attached(n));
    normalize_around(surface, &nodes);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
