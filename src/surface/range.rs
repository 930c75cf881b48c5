//! Positions and selection ranges.

use crate::markup::NodeId;

/// A boundary point inside the surface.
///
/// `offset` is a byte offset for text nodes and a child index for elements
/// (and the root).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// An opaque handle over a start/end pair captured from one surface.
///
/// The handle remembers which surface load it came from and the structural
/// revision at capture time, so a restore can decide whether its anchors
/// can still mean anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRange {
    start: Position,
    end: Position,
    generation: u64,
    revision: u64,
}

impl SelectionRange {
    pub(crate) fn new(start: Position, end: Position, generation: u64, revision: u64) -> Self {
        Self {
            start,
            end,
            generation,
            revision,
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// The surface load this range was captured from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Structural revision of the surface when the range was captured.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn with_endpoints(&self, start: Position, end: Position) -> Self {
        Self { start, end, ..*self }
    }
}
