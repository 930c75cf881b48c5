//! The live editing surface
//!
//! A `Surface` is what the user types into: a markup tree, a focus flag and
//! the single live selection. It can drift away from ContentModel at any
//! time (direct edits); the engine re-derives the model from it after every
//! operation.
//!
//! Every full reload from markup starts a new generation. Generations are
//! unique across all surfaces in the process, so a range captured from an
//! unmounted surface never resolves in its replacement.

mod edit;
mod range;

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use log::debug;

use crate::markup::{is_void, Document, NodeId};
use crate::string_utils::floor_char_boundary;

pub use range::{Position, SelectionRange};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Editable view over a markup tree.
#[derive(Debug, Clone)]
pub struct Surface {
    doc: Document,
    focused: bool,
    selection: Option<SelectionRange>,
    generation: u64,
    revision: u64,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// An empty, unfocused surface.
    pub fn new() -> Self {
        Self {
            doc: Document::new(),
            focused: false,
            selection: None,
            generation: next_generation(),
            revision: 0,
        }
    }

    /// A surface materialized from markup.
    pub fn from_markup(markup: &str) -> Self {
        let mut surface = Self::new();
        surface.load(markup);
        surface
    }

    /// Replace the whole tree. Drops the selection and starts a new generation.
    pub fn load(&mut self, markup: &str) {
        self.doc = Document::parse(markup);
        self.selection = None;
        self.generation = next_generation();
        self.revision = 0;
        debug!(
            "Surface materialized ({} bytes, generation {})",
            markup.len(),
            self.generation
        );
    }

    /// Serialize the current tree.
    pub fn to_markup(&self) -> String {
        self.doc.to_markup()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Structural revision, bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.doc.text_content(self.doc.root()).trim().is_empty()
            && !self
                .doc
                .descendants(self.doc.root())
                .into_iter()
                .any(|n| self.doc.has_tag(n, &["img", "hr", "iframe", "video"]))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Focus & Selection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Focus the surface. Focusing alone never invents a selection.
    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Move focus elsewhere, which destroys the live selection.
    pub fn blur(&mut self) {
        self.focused = false;
        self.selection = None;
    }

    /// The live selection, if the surface has one.
    pub fn selection(&self) -> Option<&SelectionRange> {
        self.selection.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Build a range over this surface, ordering the endpoints.
    pub fn range(&self, a: Position, b: Position) -> SelectionRange {
        let (start, end) = if self.compare(a, b) == Ordering::Greater {
            (b, a)
        } else {
            (a, b)
        };
        SelectionRange::new(start, end, self.generation, self.revision)
    }

    /// Select between two positions, as a pointer drag would. Focuses the surface.
    ///
    /// Returns `false` (and changes nothing) if either position is invalid.
    pub fn select(&mut self, a: Position, b: Position) -> bool {
        let (Some(a), Some(b)) = (self.clamp_position(a), self.clamp_position(b)) else {
            return false;
        };
        self.selection = Some(self.range(a, b));
        self.focused = true;
        true
    }

    /// Place a collapsed caret.
    pub fn set_caret(&mut self, pos: Position) -> bool {
        self.select(pos, pos)
    }

    /// Caret before the first character of the document.
    pub fn caret_at_start(&mut self) -> bool {
        let root = self.doc.root();
        let pos = self
            .doc
            .text_nodes(root)
            .first()
            .map_or(Position::new(root, 0), |&t| Position::new(t, 0));
        self.set_caret(pos)
    }

    /// Caret after the last character of the document.
    pub fn caret_at_end(&mut self) -> bool {
        let root = self.doc.root();
        let pos = match self.doc.text_nodes(root).last() {
            Some(&t) => Position::new(t, self.doc.len(t)),
            None => Position::new(root, self.doc.children(root).len()),
        };
        self.set_caret(pos)
    }

    /// Select the first occurrence of `needle` that lies within one text node.
    pub fn select_text(&mut self, needle: &str) -> bool {
        match self.find_text(needle) {
            Some(range) => self.select(range.start(), range.end()),
            None => false,
        }
    }

    /// Locate the first occurrence of `needle` within a single text node.
    pub fn find_text(&self, needle: &str) -> Option<SelectionRange> {
        if needle.is_empty() {
            return None;
        }
        self.doc
            .text_nodes(self.doc.root())
            .into_iter()
            .find_map(|t| {
                let text = self.doc.text(t)?;
                let at = text.find(needle)?;
                Some(self.range(
                    Position::new(t, at),
                    Position::new(t, at + needle.len()),
                ))
            })
    }

    /// Text covered by the live selection.
    pub fn selected_text(&self) -> String {
        let Some(range) = &self.selection else {
            return String::new();
        };
        let start = range.start();
        let end = range.end();
        let mut out = String::new();
        for t in self.doc.text_nodes(self.doc.root()) {
            let Some(text) = self.doc.text(t) else {
                continue;
            };
            let node_start = Position::new(t, 0);
            let node_end = Position::new(t, text.len());
            if self.compare(node_end, start) != Ordering::Greater
                || self.compare(node_start, end) != Ordering::Less
            {
                continue;
            }
            let from = if start.node == t { start.offset } else { 0 };
            let to = if end.node == t { end.offset } else { text.len() };
            let from = floor_char_boundary(text, from);
            let to = floor_char_boundary(text, to);
            if from < to {
                out.push_str(&text[from..to]);
            }
        }
        out
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Range Liveness
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether a position still points into the attached tree.
    fn position_resolves(&self, pos: Position) -> bool {
        if !self.doc.is_attached(pos.node) {
            return false;
        }
        match self.doc.text(pos.node) {
            Some(text) => pos.offset <= text.len() && text.is_char_boundary(pos.offset),
            None => {
                !self.is_void_element(pos.node)
                    && pos.offset <= self.doc.children(pos.node).len()
            }
        }
    }

    /// Void elements hold no content, so no position may point inside one.
    pub(crate) fn is_void_element(&self, node: NodeId) -> bool {
        self.doc.tag(node).is_some_and(is_void)
    }

    /// The boundary just before a void element, in its parent.
    pub(crate) fn before_void(&self, pos: Position) -> Option<Position> {
        if !self.is_void_element(pos.node) {
            return Some(pos);
        }
        let parent = self.doc.parent(pos.node)?;
        let index = self.doc.index_in_parent(pos.node)?;
        Some(Position::new(parent, index))
    }

    fn clamp_position(&self, pos: Position) -> Option<Position> {
        if !self.doc.is_attached(pos.node) {
            return None;
        }
        let pos = self.before_void(pos)?;
        let offset = match self.doc.text(pos.node) {
            Some(text) => floor_char_boundary(text, pos.offset),
            None => pos.offset.min(self.doc.children(pos.node).len()),
        };
        Some(Position::new(pos.node, offset))
    }

    /// Whether both anchors of `range` still resolve within this surface.
    pub fn resolves(&self, range: &SelectionRange) -> bool {
        range.generation() == self.generation
            && self.position_resolves(range.start())
            && self.position_resolves(range.end())
            && self.compare(range.start(), range.end()) != Ordering::Greater
    }

    /// Re-apply a previously captured range as the live selection.
    ///
    /// With `strict`, a range captured before the latest structural change is
    /// refused even if its anchors happen to resolve.
    pub fn apply_range(&mut self, range: &SelectionRange, strict: bool) -> bool {
        if !self.resolves(range) {
            return false;
        }
        if strict && range.revision() != self.revision {
            return false;
        }
        self.selection = Some(range.clone());
        self.focused = true;
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ordering
    // ─────────────────────────────────────────────────────────────────────────

    /// Document-order key: path to the node, then the offset.
    fn order_key(&self, pos: Position) -> Vec<usize> {
        let mut key = self.doc.path(pos.node);
        key.push(pos.offset);
        key
    }

    /// Compare two positions in document order.
    pub fn compare(&self, a: Position, b: Position) -> Ordering {
        self.order_key(a).cmp(&self.order_key(b))
    }

    pub(crate) fn set_selection(&mut self, selection: Option<SelectionRange>) {
        self.selection = selection;
    }

    pub(crate) fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
