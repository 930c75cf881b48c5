//! InsertionPipeline: three-tier fragment insertion.
//!
//! 1. **Native**: the host inserts the fragment at the live selection.
//! 2. **Manual**: the fragment is parsed and spliced into the live selection.
//! 3. **Append**: the fragment is appended to the document's markup.
//!
//! The saved selection is consumed by every insertion, whichever tier wins.

use log::{debug, warn};

use super::content::ContentModel;
use super::host::EditingHost;
use super::selection::SelectionTracker;
use crate::surface::Surface;

/// Which tier ended up inserting the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionTier {
    Native,
    Manual,
    Append,
}

/// Inserts fragments at the saved selection, falling back tier by tier.
pub struct InsertionPipeline<'a> {
    host: &'a mut dyn EditingHost,
    tracker: &'a mut SelectionTracker,
    model: &'a mut ContentModel,
    max_fragment_len: usize,
}

impl<'a> InsertionPipeline<'a> {
    pub fn new(
        host: &'a mut dyn EditingHost,
        tracker: &'a mut SelectionTracker,
        model: &'a mut ContentModel,
    ) -> Self {
        Self {
            host,
            tracker,
            model,
            max_fragment_len: usize::MAX,
        }
    }

    /// Refuse fragments longer than `len` bytes.
    pub fn with_max_fragment_len(mut self, len: usize) -> Self {
        self.max_fragment_len = len;
        self
    }

    /// Insert `fragment`, then re-derive the model from the surface.
    ///
    /// Returns `None` only when the insertion was abandoned: there is no
    /// surface to insert into, or the fragment exceeds the size limit.
    pub fn insert(
        &mut self,
        surface: Option<&mut Surface>,
        fragment: &str,
    ) -> Option<InsertionTier> {
        let saved = self.tracker.take();
        let Some(surface) = surface else {
            warn!("Insertion abandoned: no editing surface is mounted");
            return None;
        };
        if fragment.len() > self.max_fragment_len {
            warn!(
                "Insertion abandoned: fragment is {} bytes (limit {})",
                fragment.len(),
                self.max_fragment_len
            );
            return None;
        }

        if saved.is_some() && !self.tracker.restore(surface, saved.as_ref()) {
            debug!("Saved selection could not be restored; using the live selection if any");
        }

        let tier = if self.try_native(surface, fragment) {
            InsertionTier::Native
        } else if try_manual(surface, fragment) {
            InsertionTier::Manual
        } else {
            surface.append_markup(fragment);
            InsertionTier::Append
        };
        debug!("Inserted {} byte fragment via {:?} tier", fragment.len(), tier);

        self.model.write(surface.to_markup());
        Some(tier)
    }

    fn try_native(&mut self, surface: &mut Surface, fragment: &str) -> bool {
        if !self.host.supports_insert_html() || !surface.has_selection() {
            return false;
        }
        match self.host.insert_html(surface, fragment) {
            Ok(()) => true,
            Err(err) => {
                debug!("Native insertion failed: {}", err);
                false
            }
        }
    }
}

fn try_manual(surface: &mut Surface, fragment: &str) -> bool {
    if !surface.has_selection() {
        return false;
    }
    match surface.replace_selection_with_markup(fragment) {
        Ok(_) => true,
        Err(err) => {
            debug!("Manual insertion failed: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::host::BuiltinHost;

    fn insert_with(
        native: bool,
        surface: &mut Surface,
        tracker: &mut SelectionTracker,
        fragment: &str,
    ) -> (Option<InsertionTier>, String) {
        let mut host = BuiltinHost::new(native);
        let mut model = ContentModel::default();
        let tier =
            InsertionPipeline::new(&mut host, tracker, &mut model).insert(Some(surface), fragment);
        (tier, model.read().to_string())
    }

    fn saved_over(surface: &mut Surface, needle: &str) -> SelectionTracker {
        let mut tracker = SelectionTracker::default();
        surface.select_text(needle);
        tracker.capture(surface);
        surface.blur();
        tracker
    }

    #[test]
    fn test_native_tier() {
        let mut surface = Surface::from_markup("<p>this is a test</p>");
        let mut tracker = saved_over(&mut surface, "test");
        let (tier, model) = insert_with(
            true,
            &mut surface,
            &mut tracker,
            "<a href=\"https://example.com\">test</a>",
        );
        assert_eq!(tier, Some(InsertionTier::Native));
        assert_eq!(model, "<p>this is a <a href=\"https://example.com\">test</a></p>");
        assert!(tracker.saved().is_none());
    }

    #[test]
    fn test_manual_tier_when_native_unavailable() {
        let mut surface = Surface::from_markup("<p>x y</p>");
        let mut tracker = saved_over(&mut surface, "y");
        let (tier, model) = insert_with(false, &mut surface, &mut tracker, "<img src=\"y.png\">");
        assert_eq!(tier, Some(InsertionTier::Manual));
        assert_eq!(model, "<p>x <img src=\"y.png\"></p>");
    }

    #[test]
    fn test_append_tier_without_selection() {
        let mut surface = Surface::from_markup("<p>hello</p>");
        let mut tracker = SelectionTracker::default();
        assert!(tracker.capture(&surface).is_none());
        let (tier, model) = insert_with(true, &mut surface, &mut tracker, "<img src='x.jpg'>");
        assert_eq!(tier, Some(InsertionTier::Append));
        assert!(model.ends_with("<img src=\"x.jpg\">"));
        assert_eq!(model, "<p>hello</p><img src=\"x.jpg\">");
    }

    #[test]
    fn test_stale_selection_falls_back_to_append() {
        let mut surface = Surface::from_markup("<p>hello</p>");
        let mut tracker = saved_over(&mut surface, "hello");
        surface.load("<p>replaced</p>");
        let (tier, model) = insert_with(true, &mut surface, &mut tracker, "<b>!</b>");
        assert_eq!(tier, Some(InsertionTier::Append));
        assert_eq!(model, "<p>replaced</p><b>!</b>");
    }

    #[test]
    fn test_no_surface_abandons_and_consumes() {
        let mut surface = Surface::from_markup("<p>a</p>");
        let mut tracker = saved_over(&mut surface, "a");
        let mut host = BuiltinHost::default();
        let mut model = ContentModel::new("<p>a</p>");
        let tier =
            InsertionPipeline::new(&mut host, &mut tracker, &mut model).insert(None, "<b>x</b>");
        assert_eq!(tier, None);
        assert!(tracker.saved().is_none());
        assert_eq!(model.read(), "<p>a</p>");
    }

    #[test]
    fn test_oversized_fragment_rejected() {
        let mut surface = Surface::from_markup("<p>a</p>");
        let mut tracker = SelectionTracker::default();
        let mut host = BuiltinHost::default();
        let mut model = ContentModel::default();
        let tier = InsertionPipeline::new(&mut host, &mut tracker, &mut model)
            .with_max_fragment_len(4)
            .insert(Some(&mut surface), "<b>long</b>");
        assert_eq!(tier, None);
        assert_eq!(surface.to_markup(), "<p>a</p>");
    }

    #[test]
    fn test_fragment_always_lands_somewhere() {
        let fragments = ["<em>f</em>", "plain f", "<p>f</p>", "<img src=\"f.png\" alt=\"f\">"];
        for fragment in fragments {
            for native in [true, false] {
                for select in [true, false] {
                    let mut surface = Surface::from_markup("<p>one two</p>");
                    let mut tracker = if select {
                        saved_over(&mut surface, "two")
                    } else {
                        SelectionTracker::default()
                    };
                    let (tier, model) = insert_with(native, &mut surface, &mut tracker, fragment);
                    assert!(tier.is_some());
                    assert!(model.contains('f'), "{} lost in {}", fragment, model);
                }
            }
        }
    }

    /// Every caret and range position in `markup`, void elements included.
    fn all_positions(markup: &str) -> Vec<crate::surface::Position> {
        use crate::surface::Position;
        let surface = Surface::from_markup(markup);
        let doc = surface.document();
        let root = doc.root();
        std::iter::once(root)
            .chain(doc.descendants(root))
            .flat_map(|node| {
                let len = doc.text(node).map_or(doc.children(node).len(), str::len);
                (0..=len).map(move |offset| Position::new(node, offset))
            })
            .collect()
    }

    #[test]
    fn test_fragment_survives_every_selection() {
        let markup = "<p>ab</p><ol><li>xy</li><li>z</li></ol><hr><p>c<img src=\"x\">d</p>";
        let positions = all_positions(markup);
        for &a in &positions {
            for &b in &positions {
                let mut surface = Surface::from_markup(markup);
                assert!(surface.select(a, b));
                let mut tracker = SelectionTracker::default();
                let (tier, model) = insert_with(true, &mut surface, &mut tracker, "<b>FRAG</b>");

                assert_eq!(tier, Some(InsertionTier::Native));
                assert!(model.contains("<b>FRAG</b>"), "{:?}..{:?} lost it: {}", a, b, model);
                assert_eq!(
                    Surface::from_markup(&model).to_markup(),
                    model,
                    "{:?}..{:?} produced non-canonical markup",
                    a,
                    b
                );
            }
        }
    }
}
