//! Toolbar state reflection.

use super::command::Alignment;
use super::formatter::{BOLD, ITALIC, STRIKE, UNDERLINE};
use crate::markup::NodeId;
use crate::surface::Surface;

/// Kind of list the caret is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// Current formatting state at the selection start.
/// Used for toolbar state reflection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattingState {
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub is_strikethrough: bool,
    pub is_link: bool,
    /// Tag of the enclosing block (None at root level)
    pub block_tag: Option<String>,
    pub alignment: Option<Alignment>,
    pub list: Option<ListKind>,
    /// Legacy 1-7 font size
    pub font_size: Option<u8>,
    pub fore_color: Option<String>,
    pub back_color: Option<String>,
}

/// Detect the formatting state at the selection start.
///
/// Reads the tree only; nothing is cached between calls.
pub fn detect_formatting_state(surface: &Surface) -> FormattingState {
    let Some(range) = surface.selection() else {
        return FormattingState::default();
    };
    let node = range.start().node;
    let doc = surface.document();
    let chain: Vec<NodeId> = std::iter::once(node).chain(doc.ancestors(node)).collect();
    let fonts = surface.inline_ancestors(node, &["font"]);

    FormattingState {
        is_bold: !surface.inline_ancestors(node, BOLD).is_empty(),
        is_italic: !surface.inline_ancestors(node, ITALIC).is_empty(),
        is_underline: !surface.inline_ancestors(node, UNDERLINE).is_empty(),
        is_strikethrough: !surface.inline_ancestors(node, STRIKE).is_empty(),
        is_link: !surface.inline_ancestors(node, &["a"]).is_empty(),
        block_tag: surface
            .nearest_block(node)
            .and_then(|b| doc.tag(b))
            .map(str::to_string),
        alignment: chain
            .iter()
            .filter(|&&n| doc.is_block_element(n))
            .find_map(|&n| doc.style_property(n, "text-align"))
            .and_then(|v| Alignment::from_css(&v)),
        list: chain.iter().find_map(|&n| match doc.tag(n) {
            Some("ol") => Some(ListKind::Ordered),
            Some("ul") => Some(ListKind::Unordered),
            _ => None,
        }),
        font_size: fonts
            .iter()
            .find_map(|&f| doc.attr(f, "size").and_then(|s| s.trim().parse().ok())),
        fore_color: fonts
            .iter()
            .find_map(|&f| doc.attr(f, "color"))
            .map(str::to_string),
        back_color: surface
            .inline_ancestors(node, &["span", "font"])
            .into_iter()
            .find_map(|n| doc.style_property(n, "background-color")),
    }
}
