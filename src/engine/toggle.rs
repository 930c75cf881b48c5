//! BlockFormatToggler: on/off block formatting decided by ancestry.
//!
//! There is no stored "is quoted" flag. Whether the toggle turns a format
//! on or off is recomputed from the tree every time.

use log::debug;

use super::command::{Command, BLOCK_FORMATS};
use super::executor::CommandExecutor;
use crate::markup::NodeId;
use crate::surface::Surface;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The block was reformatted to the tag
    On,
    /// The block was turned back into a plain paragraph
    Off,
}

/// The nearest node carrying `tag`, walking up from the selection anchor
/// (the anchor itself included) to the surface root.
pub fn block_membership(surface: &Surface, tag: &str) -> Option<NodeId> {
    let anchor = surface.selection()?.start().node;
    let doc = surface.document();
    std::iter::once(anchor)
        .chain(doc.ancestors(anchor))
        .find(|&n| doc.has_tag(n, &[tag]))
}

/// Toggle `tag` on the block containing the selection.
///
/// Returns `None` when there is no selection or the tag is not a block format.
pub fn toggle_block(executor: &mut CommandExecutor<'_>, tag: &str) -> Option<ToggleOutcome> {
    let tag = tag.trim().to_ascii_lowercase();
    if !BLOCK_FORMATS.contains(&tag.as_str()) {
        debug!("'{}' is not a block format; toggle ignored", tag);
        return None;
    }
    if !executor.surface().has_selection() {
        return None;
    }
    match block_membership(executor.surface(), &tag) {
        Some(block) => {
            let targets = formatted_blocks(executor.surface(), &tag, block);
            executor.mutate(|surface| {
                for target in &targets {
                    if surface.document().is_attached(*target) {
                        reformat_as_paragraph(surface, *target);
                    }
                }
            });
            debug!("Toggled '{}' off on {} block(s)", tag, targets.len());
            Some(ToggleOutcome::Off)
        }
        None => {
            if executor.execute(&Command::FormatBlock(tag.clone())) {
                debug!("Toggled '{}' on", tag);
                Some(ToggleOutcome::On)
            } else {
                None
            }
        }
    }
}

/// Every `tag` block the selection touches, starting with `anchor_block`.
///
/// Turning a format on retags each touched block, so turning it off has to
/// release each of them too.
fn formatted_blocks(surface: &Surface, tag: &str, anchor_block: NodeId) -> Vec<NodeId> {
    let doc = surface.document();
    let mut targets = vec![anchor_block];
    for block in surface.selected_blocks() {
        let formatted = std::iter::once(block)
            .chain(doc.ancestors(block))
            .find(|&n| doc.has_tag(n, &[tag]));
        if let Some(found) = formatted {
            if !targets.contains(&found) {
                targets.push(found);
            }
        }
    }
    targets
}

/// A block holding other blocks is unwrapped; a block holding inline
/// content becomes a `<p>`.
fn reformat_as_paragraph(surface: &mut Surface, block: NodeId) {
    let doc = surface.document();
    let has_block_children = doc
        .children(block)
        .iter()
        .any(|&c| doc.is_block_element(c));
    if has_block_children {
        surface.unwrap_element(block);
    } else {
        surface.doc_mut().rename(block, "p");
        surface.touch();
    }
}
