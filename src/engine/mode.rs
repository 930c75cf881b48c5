//! Editing / previewing mode switching.

use log::debug;
use serde::{Deserialize, Serialize};

use super::content::ContentModel;
use crate::surface::Surface;

/// Which view the editor is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Editable surface
    #[default]
    Editing,
    /// Read-only rendering of ContentModel
    Previewing,
}

impl Mode {
    /// Toggle between Editing and Previewing.
    pub fn toggle(&self) -> Self {
        match self {
            Mode::Editing => Mode::Previewing,
            Mode::Previewing => Mode::Editing,
        }
    }

    /// Get a display label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Editing => "Edit",
            Mode::Previewing => "Preview",
        }
    }

    /// Get an icon/symbol for the mode.
    pub fn icon(&self) -> &'static str {
        match self {
            Mode::Editing => "📝",
            Mode::Previewing => "👁",
        }
    }
}

/// Drives the two mode transitions.
///
/// The controller owns only the mode flag. The surface slot and the model
/// are passed in, since the editor owns them.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
}

impl ModeController {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Editing → previewing.
    ///
    /// The model is refreshed from the surface (and the owner notified)
    /// before the surface is dropped. Returns `false` if already previewing.
    pub fn enter_preview(
        &mut self,
        surface: &mut Option<Surface>,
        model: &mut ContentModel,
    ) -> bool {
        if self.mode == Mode::Previewing {
            return false;
        }
        if let Some(live) = surface.take() {
            model.write(live.to_markup());
        }
        self.mode = Mode::Previewing;
        debug!("Switched to preview ({} bytes)", model.read().len());
        true
    }

    /// Previewing → editing.
    ///
    /// Mounts a fresh, empty surface. The caller must re-materialize it from
    /// the model on the next tick. Returns `false` if already editing.
    pub fn enter_editing(&mut self, surface: &mut Option<Surface>) -> bool {
        if self.mode == Mode::Editing {
            return false;
        }
        *surface = Some(Surface::new());
        self.mode = Mode::Editing;
        debug!("Switched to editing; surface awaiting materialization");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_toggle() {
        assert_eq!(Mode::Editing.toggle(), Mode::Previewing);
        assert_eq!(Mode::Previewing.toggle(), Mode::Editing);
        assert_eq!(Mode::default(), Mode::Editing);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Previewing).unwrap(), "\"previewing\"");
        let mode: Mode = serde_json::from_str("\"editing\"").unwrap();
        assert_eq!(mode, Mode::Editing);
    }

    #[test]
    fn test_enter_preview_syncs_model_first() {
        let mut model = ContentModel::new("<p>old</p>");
        let mut surface = Some(Surface::from_markup("<p>new</p>"));
        let mut controller = ModeController::new(Mode::Editing);

        assert!(controller.enter_preview(&mut surface, &mut model));
        assert_eq!(model.read(), "<p>new</p>");
        assert!(surface.is_none());
        assert!(!controller.enter_preview(&mut surface, &mut model));
    }

    #[test]
    fn test_enter_editing_mounts_empty_surface() {
        let mut surface = None;
        let mut controller = ModeController::new(Mode::Previewing);
        assert!(controller.enter_editing(&mut surface));
        assert_eq!(controller.mode(), Mode::Editing);
        assert_eq!(surface.map(|s| s.to_markup()), Some(String::new()));
    }
}
