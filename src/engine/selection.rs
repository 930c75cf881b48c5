//! SelectionTracker: explicit capture and restore of the surface selection.

use log::debug;

use crate::surface::{SelectionRange, Surface};

/// Holds the most recently captured selection range.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    saved: Option<SelectionRange>,
    strict: bool,
}

impl SelectionTracker {
    /// With `strict`, restoring a range captured before the surface's last
    /// structural change is refused.
    pub fn new(strict: bool) -> Self {
        Self {
            saved: None,
            strict,
        }
    }

    /// Capture the live selection, replacing the saved one.
    ///
    /// Returns `None` (and forgets the previous capture) when the surface is
    /// unfocused or has no selection. Callers treat that as "end of document".
    pub fn capture(&mut self, surface: &Surface) -> Option<SelectionRange> {
        self.saved = if surface.is_focused() {
            surface.selection().cloned()
        } else {
            None
        };
        self.saved.clone()
    }

    pub fn saved(&self) -> Option<&SelectionRange> {
        self.saved.as_ref()
    }

    /// Consume the saved range.
    pub fn take(&mut self) -> Option<SelectionRange> {
        self.saved.take()
    }

    pub fn clear(&mut self) {
        self.saved = None;
    }

    /// Try to make `range` the live selection again.
    ///
    /// Best effort: if the anchors no longer resolve, nothing changes and
    /// `false` is returned. The surface's current selection stays as it was.
    pub fn restore(&self, surface: &mut Surface, range: Option<&SelectionRange>) -> bool {
        let Some(range) = range else {
            return false;
        };
        let restored = surface.apply_range(range, self.strict);
        if !restored {
            debug!(
                "Stale selection not restored (generation {}, revision {})",
                range.generation(),
                range.revision()
            );
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_requires_focus() {
        let mut surface = Surface::from_markup("<p>a test</p>");
        let mut tracker = SelectionTracker::default();
        assert!(tracker.capture(&surface).is_none());

        surface.select_text("test");
        assert!(tracker.capture(&surface).is_some());

        surface.blur();
        assert!(tracker.capture(&surface).is_none());
        assert!(tracker.saved().is_none());
    }

    #[test]
    fn test_restore_after_blur() {
        let mut surface = Surface::from_markup("<p>a test</p>");
        let mut tracker = SelectionTracker::default();
        surface.select_text("test");
        tracker.capture(&surface);
        surface.blur();

        let saved = tracker.take();
        assert!(tracker.restore(&mut surface, saved.as_ref()));
        assert_eq!(surface.selected_text(), "test");
        assert!(tracker.saved().is_none());
    }

    #[test]
    fn test_restore_stale_range_is_noop() {
        let mut surface = Surface::from_markup("<p>a test</p>");
        let mut tracker = SelectionTracker::default();
        surface.select_text("test");
        let saved = tracker.capture(&surface);

        surface.load("<p>other</p>");
        surface.select_text("other");
        assert!(!tracker.restore(&mut surface, saved.as_ref()));
        assert_eq!(surface.selected_text(), "other");
        assert!(!tracker.restore(&mut surface, None));
    }

    #[test]
    fn test_strict_tracker_rejects_after_edit() {
        let mut surface = Surface::from_markup("<p>a test</p>");
        let mut tracker = SelectionTracker::new(true);
        surface.select_text("a");
        let saved = tracker.capture(&surface);
        surface.caret_at_end();
        surface.type_text("!");
        assert!(!tracker.restore(&mut surface, saved.as_ref()));

        let lenient = SelectionTracker::new(false);
        assert!(lenient.restore(&mut surface, saved.as_ref()));
    }
}
