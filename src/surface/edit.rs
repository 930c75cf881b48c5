//! Structural edits on the surface tree.
//!
//! These are the primitives the built-in host composes its commands from.
//! Every mutating primitive bumps the surface revision.

use std::cmp::Ordering;

use log::debug;

use super::{Position, Surface};
use crate::error::{Error, Result};
use crate::markup::{Document, NodeId};
use crate::string_utils::floor_char_boundary;

/// Inline wrappers that are dropped once they have no content left.
const DROPPABLE_WHEN_EMPTY: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "strike", "del", "font", "span",
];

/// Inline elements merged with an identical adjacent sibling.
const MERGEABLE: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "strike", "del", "font", "span", "a",
];

/// Blocks that hold inline content and can be retagged by `formatBlock`.
const TEXT_BLOCKS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "pre",
    "blockquote",
    "div",
    "address",
    "li",
    "figure",
    "section",
    "article",
];

type Endpoints = Option<(Position, Position)>;

impl Surface {
    // ─────────────────────────────────────────────────────────────────────────
    // Boundaries
    // ─────────────────────────────────────────────────────────────────────────

    /// Split a text node at `offset`. The tail becomes the next sibling and is returned.
    pub(crate) fn split_text(&mut self, node: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.doc.text(node)?.to_string();
        let parent = self.doc.parent(node)?;
        let index = self.doc.index_in_parent(node)?;
        let at = floor_char_boundary(&text, offset);
        let tail = self.doc.create_text(&text[at..]);
        self.doc.set_text(node, text[..at].to_string());
        self.doc.insert_child(parent, index + 1, tail);
        self.touch();
        Some(tail)
    }

    /// Turn a position into a child boundary of an element, splitting text if needed.
    ///
    /// The flag reports whether a split happened.
    fn boundary_of(&mut self, pos: Position) -> (Position, bool) {
        let Some(len) = self.doc.text(pos.node).map(str::len) else {
            return (pos, false);
        };
        let (Some(parent), Some(index)) =
            (self.doc.parent(pos.node), self.doc.index_in_parent(pos.node))
        else {
            return (pos, false);
        };
        if pos.offset == 0 {
            (Position::new(parent, index), false)
        } else if pos.offset >= len {
            (Position::new(parent, index + 1), false)
        } else {
            self.split_text(pos.node, pos.offset);
            (Position::new(parent, index + 1), true)
        }
    }

    /// Convert both selection endpoints into child boundaries.
    ///
    /// The selection is rewritten to the boundaries, which are returned.
    pub(crate) fn split_selection(&mut self) -> Endpoints {
        let range = self.selection.clone()?;
        let (mut end, _) = self.boundary_of(range.end());
        let (start, split) = self.boundary_of(range.start());
        if split && end.node == start.node && end.offset >= start.offset {
            end.offset += 1;
        }
        self.selection = Some(self.range(start, end));
        Some((start, end))
    }

    /// Top-level nodes lying entirely between two child boundaries, in document order.
    pub(crate) fn contained_nodes(&self, start: Position, end: Position) -> Vec<NodeId> {
        let mut out = Vec::new();
        let root = self.doc.root();
        let mut stack: Vec<NodeId> = self.doc.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            let (Some(parent), Some(index)) =
                (self.doc.parent(node), self.doc.index_in_parent(node))
            else {
                continue;
            };
            let before = Position::new(parent, index);
            let after = Position::new(parent, index + 1);
            if self.compare(start, before) != Ordering::Greater
                && self.compare(after, end) != Ordering::Greater
            {
                out.push(node);
            } else if self.compare(before, end) == Ordering::Less
                && self.compare(after, start) == Ordering::Greater
            {
                stack.extend(self.doc.children(node).iter().rev());
            }
        }
        out
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Delete & Insert
    // ─────────────────────────────────────────────────────────────────────────

    /// Delete the selected content and collapse the selection to the caret.
    ///
    /// When the selection ends inside a different text block than it starts
    /// in, what is left of the trailing block is merged into the leading one.
    pub(crate) fn delete_selection_contents(&mut self) -> Option<Position> {
        let (start, end) = self.split_selection()?;
        if self.compare(start, end) != Ordering::Less {
            self.selection = Some(self.range(start, start));
            return Some(start);
        }

        let end_block = self.nearest_block(end.node);
        let mut caret = start;
        for node in self.contained_nodes(start, end) {
            if self.doc.contains(node, caret.node) {
                let parent = self.doc.parent(node);
                if let (Some(parent), Some(index)) = (parent, self.doc.index_in_parent(node)) {
                    caret = Position::new(parent, index);
                }
            }
            self.doc.detach(node);
        }

        let start_block = self.nearest_block(caret.node);
        if let (Some(leading), Some(trailing)) = (start_block, end_block) {
            // Containers (lists, nested quotes) keep their structure
            if leading != trailing
                && self.doc.is_attached(trailing)
                && self.is_text_block(leading)
                && self.is_text_block(trailing)
                && !self.doc.contains(leading, trailing)
                && !self.doc.contains(trailing, leading)
            {
                self.merge_block_into(trailing, leading);
            }
        }

        self.touch();
        self.selection = Some(self.range(caret, caret));
        Some(caret)
    }

    /// Move the children of `from` to the end of `into`, then drop `from` and
    /// any ancestors it leaves empty.
    fn merge_block_into(&mut self, from: NodeId, into: NodeId) {
        let root = self.doc.root();
        let mut parent = self.doc.parent(from);
        for child in self.doc.children(from).to_vec() {
            self.doc.append_child(into, child);
        }
        self.doc.detach(from);
        while let Some(p) = parent {
            if p == root || !self.doc.children(p).is_empty() || self.doc.contains(p, into) {
                break;
            }
            parent = self.doc.parent(p);
            self.doc.detach(p);
        }
    }

    /// Insert detached nodes at a position. Returns the boundary right after them.
    pub(crate) fn insert_nodes(&mut self, at: Position, nodes: &[NodeId]) -> Position {
        let at = self.before_void(at).unwrap_or(at);
        let (at, _) = self.boundary_of(at);
        for (i, &node) in nodes.iter().enumerate() {
            self.doc.insert_child(at.node, at.offset + i, node);
        }
        self.touch();
        Position::new(at.node, at.offset + nodes.len())
    }

    /// Replace the live selection with a parsed fragment and collapse the
    /// selection to just after it.
    pub fn replace_selection_with_markup(&mut self, fragment: &str) -> Result<Position> {
        if self.selection.is_none() {
            return Err(Error::NoSelection);
        }
        let caret = self.delete_selection_contents().ok_or(Error::NoSelection)?;
        let nodes = self.doc.parse_fragment(fragment);
        let after = self.insert_nodes(caret, &nodes);
        self.selection = Some(self.range(after, after));
        debug!("Replaced selection with {} node(s)", nodes.len());
        Ok(after)
    }

    /// Append raw markup to the end of the document and re-materialize.
    pub fn append_markup(&mut self, fragment: &str) {
        let mut markup = self.to_markup();
        markup.push_str(fragment);
        self.load(&markup);
    }

    /// Type text at the live selection the way a keystroke would.
    ///
    /// Returns `false` when the surface is unfocused or has no caret.
    pub fn type_text(&mut self, text: &str) -> bool {
        if !self.focused || self.selection.is_none() {
            return false;
        }
        let Some(caret) = self.delete_selection_contents() else {
            return false;
        };
        let previous = caret
            .offset
            .checked_sub(1)
            .and_then(|i| self.doc.children(caret.node).get(i).copied())
            .filter(|&n| self.doc.is_text(n));
        let (node, offset) = match previous {
            Some(node) => {
                let mut content = self.doc.text(node).unwrap_or_default().to_string();
                content.push_str(text);
                let len = content.len();
                self.doc.set_text(node, content);
                (node, len)
            }
            None => {
                let node = self.doc.create_text(text);
                self.doc.insert_child(caret.node, caret.offset, node);
                (node, text.len())
            }
        };
        self.touch();
        let pos = Position::new(node, offset);
        self.selection = Some(self.range(pos, pos));
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Non-empty text nodes lying entirely inside the selection, after splitting
    /// at its boundaries. The selection is reset to span exactly these nodes.
    pub(crate) fn selected_text_nodes(&mut self) -> Vec<NodeId> {
        let Some((start, end)) = self.split_selection() else {
            return Vec::new();
        };
        let nodes: Vec<NodeId> = self
            .doc
            .text_nodes(self.doc.root())
            .into_iter()
            .filter(|&t| {
                let len = self.doc.len(t);
                len > 0
                    && self.compare(start, Position::new(t, 0)) != Ordering::Greater
                    && self.compare(Position::new(t, len), end) != Ordering::Greater
            })
            .collect();
        if let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) {
            let len = self.doc.len(last);
            self.selection = Some(self.range(Position::new(first, 0), Position::new(last, len)));
        }
        nodes
    }

    /// Split every element between `node` and `ancestor` so that `ancestor`
    /// keeps only the path down to `node`. Siblings move into shallow clones
    /// placed on either side.
    pub(crate) fn isolate(&mut self, ancestor: NodeId, node: NodeId) {
        if !self.doc.contains(ancestor, node) {
            return;
        }
        let mut current = node;
        while current != ancestor {
            let Some(parent) = self.doc.parent(current) else {
                return;
            };
            self.split_around(parent, current);
            current = parent;
        }
        self.touch();
    }

    fn split_around(&mut self, parent: NodeId, child: NodeId) {
        let Some(index) = self.doc.index_in_parent(child) else {
            return;
        };
        let (Some(grand), Some(parent_index)) =
            (self.doc.parent(parent), self.doc.index_in_parent(parent))
        else {
            return;
        };
        let children = self.doc.children(parent).to_vec();
        let after = &children[index + 1..];
        if !after.is_empty() {
            let clone = self.doc.shallow_clone(parent);
            for &c in after {
                self.doc.append_child(clone, c);
            }
            self.doc.insert_child(grand, parent_index + 1, clone);
        }
        let before = &children[..index];
        if !before.is_empty() {
            let clone = self.doc.shallow_clone(parent);
            for &c in before {
                self.doc.append_child(clone, c);
            }
            self.doc.insert_child(grand, parent_index, clone);
        }
    }

    /// Replace an element with its children, carrying selection endpoints along.
    pub(crate) fn unwrap_element(&mut self, id: NodeId) {
        let (Some(parent), Some(index)) = (self.doc.parent(id), self.doc.index_in_parent(id)) else {
            return;
        };
        let count = self.doc.children(id).len();
        let remap = |p: Position| {
            if p.node == id {
                Position::new(parent, index + p.offset)
            } else if p.node == parent && p.offset > index {
                Position::new(parent, p.offset + count - 1)
            } else {
                p
            }
        };
        let endpoints = self
            .selection
            .as_ref()
            .map(|r| (remap(r.start()), remap(r.end())));
        self.doc.unwrap(id);
        if let Some((start, end)) = endpoints {
            self.selection = Some(self.range(start, end));
        }
        self.touch();
    }

    /// The node itself or its closest block-level ancestor.
    pub(crate) fn nearest_block(&self, node: NodeId) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.doc.ancestors(node))
            .find(|&n| self.doc.is_block_element(n))
    }

    /// Inline ancestors of `node` (itself included) carrying one of `tags`,
    /// innermost first. The walk stops at the enclosing block.
    pub(crate) fn inline_ancestors(&self, node: NodeId, tags: &[&str]) -> Vec<NodeId> {
        let root = self.doc.root();
        let mut out = Vec::new();
        for n in std::iter::once(node).chain(self.doc.ancestors(node)) {
            if n == root || self.doc.is_block_element(n) {
                break;
            }
            if self.doc.has_tag(n, tags) {
                out.push(n);
            }
        }
        out
    }

    /// Make sure the content at `pos` sits inside a block.
    ///
    /// A run of inline content directly under the root is wrapped into a new
    /// `<p>`; a caret between blocks (or in an empty document) gets an empty
    /// paragraph. Selection endpoints are carried along.
    pub(crate) fn ensure_block(&mut self, pos: Position) -> Option<NodeId> {
        if let Some(block) = self.nearest_block(pos.node) {
            return Some(block);
        }
        let root = self.doc.root();
        let children = self.doc.children(root).to_vec();
        let index = if pos.node == root {
            pos.offset.min(children.len())
        } else {
            let top = std::iter::once(pos.node)
                .chain(self.doc.ancestors(pos.node))
                .find(|&n| self.doc.parent(n) == Some(root))?;
            self.doc.index_in_parent(top)?
        };

        let mut run_start = index;
        while run_start > 0 && !self.doc.is_block_element(children[run_start - 1]) {
            run_start -= 1;
        }
        let mut run_end = index;
        while run_end < children.len() && !self.doc.is_block_element(children[run_end]) {
            run_end += 1;
        }

        let block = self.doc.create_element("p", Vec::new());
        for &child in &children[run_start..run_end] {
            self.doc.append_child(block, child);
        }
        self.doc.insert_child(root, run_start, block);

        if let Some(range) = self.selection.clone() {
            let run_len = run_end - run_start;
            let remap = |p: Position| {
                if p.node != root || p.offset < run_start {
                    p
                } else if p.offset <= run_end {
                    Position::new(block, p.offset - run_start)
                } else {
                    Position::new(root, p.offset + 1 - run_len)
                }
            };
            self.selection = Some(self.range(remap(range.start()), remap(range.end())));
        }
        self.touch();
        debug!("Wrapped {} root-level node(s) into a paragraph", run_end - run_start);
        Some(block)
    }

    /// Whether `node` is a block that holds inline content only.
    pub(crate) fn is_text_block(&self, node: NodeId) -> bool {
        self.doc.has_tag(node, TEXT_BLOCKS)
            && !self
                .doc
                .descendants(node)
                .into_iter()
                .any(|d| self.doc.is_block_element(d))
    }

    /// Text blocks touched by the selection, in document order.
    pub(crate) fn selected_blocks(&self) -> Vec<NodeId> {
        let Some(range) = &self.selection else {
            return Vec::new();
        };
        let (start, end) = (range.start(), range.end());
        self.doc
            .descendants(self.doc.root())
            .into_iter()
            .filter(|&n| self.is_text_block(n))
            .filter(|&n| {
                let (Some(parent), Some(index)) = (self.doc.parent(n), self.doc.index_in_parent(n))
                else {
                    return false;
                };
                self.compare(Position::new(parent, index), end) == Ordering::Less
                    && self.compare(Position::new(parent, index + 1), start) == Ordering::Greater
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Normalization
    // ─────────────────────────────────────────────────────────────────────────

    /// Tidy the subtree under `scope`: drop empty text and empty inline
    /// wrappers, merge adjacent text and identical inline elements.
    pub(crate) fn normalize(&mut self, scope: NodeId) {
        let mut endpoints = self.selection.as_ref().map(|r| (r.start(), r.end()));
        self.normalize_node(scope, &mut endpoints);
        if let Some((start, end)) = endpoints {
            self.selection = Some(self.range(start, end));
        }
        self.touch();
    }

    fn normalize_node(&mut self, id: NodeId, endpoints: &mut Endpoints) {
        for child in self.doc.children(id).to_vec() {
            if !self.doc.is_text(child) {
                self.normalize_node(child, endpoints);
            }
        }

        let mut i = 0;
        while i < self.doc.children(id).len() {
            let child = self.doc.children(id)[i];
            let empty_text = self.doc.text(child).is_some_and(str::is_empty);
            let empty_wrapper = self.doc.has_tag(child, DROPPABLE_WHEN_EMPTY)
                && self.doc.children(child).is_empty();
            if empty_text || empty_wrapper {
                self.remap(endpoints, |doc, p| {
                    if doc.contains(child, p.node) {
                        Position::new(id, i)
                    } else if p.node == id && p.offset > i {
                        Position::new(id, p.offset - 1)
                    } else {
                        p
                    }
                });
                self.doc.detach(child);
                continue;
            }

            if i > 0 {
                let prev = self.doc.children(id)[i - 1];
                if self.mergeable(prev, child) {
                    let prev_len = self.doc.len(prev);
                    self.remap(endpoints, |_, p| {
                        if p.node == child {
                            Position::new(prev, prev_len + p.offset)
                        } else if p.node == id && p.offset == i {
                            Position::new(prev, prev_len)
                        } else if p.node == id && p.offset > i {
                            Position::new(id, p.offset - 1)
                        } else {
                            p
                        }
                    });
                    if let Some(tail) = self.doc.text(child).map(str::to_string) {
                        let mut text = self.doc.text(prev).unwrap_or_default().to_string();
                        text.push_str(&tail);
                        self.doc.set_text(prev, text);
                    } else {
                        for grandchild in self.doc.children(child).to_vec() {
                            self.doc.append_child(prev, grandchild);
                        }
                        self.normalize_node(prev, endpoints);
                    }
                    self.doc.detach(child);
                    continue;
                }
            }
            i += 1;
        }
    }

    fn mergeable(&self, a: NodeId, b: NodeId) -> bool {
        if self.doc.is_text(a) && self.doc.is_text(b) {
            return true;
        }
        self.doc.has_tag(a, MERGEABLE) && self.doc.element(a) == self.doc.element(b)
    }

    fn remap<F>(&self, endpoints: &mut Endpoints, f: F)
    where
        F: Fn(&Document, Position) -> Position,
    {
        if let Some((start, end)) = endpoints {
            *start = f(&self.doc, *start);
            *end = f(&self.doc, *end);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
