//! The rich-text editor component
//!
//! `RichTextEditor` is the unit a page embeds. It owns ContentModel, the
//! editing surface (mounted only while editing), the selection tracker, the
//! host, the mode controller, the open insertion dialog and the deferred
//! task queue.
//!
//! Host events (`on_pointer_up`, `on_key_up`, `on_click`) only schedule a
//! selection capture; `tick` runs it, mirroring how the platform finalizes
//! its own selection first.
//!
//! # Example
//! ```ignore
//! use lectern::{EditorProps, EditorSettings, RichTextEditor};
//!
//! let mut editor = RichTextEditor::new(
//!     EditorProps::with_value("<p>this is a test</p>"),
//!     EditorSettings::default(),
//! );
//! editor.surface_mut().unwrap().select_text("test");
//! editor.on_pointer_up();
//! editor.tick();
//! editor.open_link_dialog();
//! editor.dialog_mut().unwrap().set_url("example.com");
//! editor.submit_dialog();
//! ```

use std::collections::VecDeque;

use log::{debug, info};

use crate::config::EditorSettings;
use crate::dialogs::{DialogResult, InsertionDialog};
use crate::engine::{
    detect_formatting_state, toggle_block, BuiltinHost, Command, CommandExecutor, ContentModel,
    EditingHost, FormattingState, InsertionPipeline, InsertionTier, Mode, ModeController,
    SelectionTracker, ToggleOutcome,
};
use crate::preview::{render_preview, PreviewOptions};
use crate::surface::Surface;

// ─────────────────────────────────────────────────────────────────────────────
// Props
// ─────────────────────────────────────────────────────────────────────────────

/// Inputs supplied by the owning page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorProps {
    /// Initial document markup
    pub initial_value: String,
    /// Disabled editors ignore every editing operation
    pub disabled: bool,
    /// Validity flag; affects presentation only
    pub invalid: bool,
    /// Shown while the document is empty
    pub placeholder: String,
    pub label: Option<String>,
}

impl EditorProps {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            initial_value: value.into(),
            ..Self::default()
        }
    }
}

/// Work deferred to the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    CaptureSelection,
    Rematerialize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor
// ─────────────────────────────────────────────────────────────────────────────

pub struct RichTextEditor {
    props: EditorProps,
    settings: EditorSettings,
    model: ContentModel,
    surface: Option<Surface>,
    tracker: SelectionTracker,
    host: Box<dyn EditingHost>,
    modes: ModeController,
    dialog: Option<InsertionDialog>,
    deferred: VecDeque<Deferred>,
}

impl RichTextEditor {
    /// Mount an editor using the built-in host.
    pub fn new(props: EditorProps, settings: EditorSettings) -> Self {
        let host = BuiltinHost::new(settings.native_insertion);
        Self::with_host(props, settings, Box::new(host))
    }

    /// Mount an editor on a custom host.
    pub fn with_host(
        props: EditorProps,
        settings: EditorSettings,
        host: Box<dyn EditingHost>,
    ) -> Self {
        let mode = settings.default_mode;
        let surface = match mode {
            Mode::Editing => Some(Surface::from_markup(&props.initial_value)),
            Mode::Previewing => None,
        };
        debug!(
            "Editor mounted in {:?} mode ({} bytes)",
            mode,
            props.initial_value.len()
        );
        Self {
            model: ContentModel::new(props.initial_value.clone()),
            tracker: SelectionTracker::new(settings.strict_range_validation),
            props,
            settings,
            surface,
            host,
            modes: ModeController::new(mode),
            dialog: None,
            deferred: VecDeque::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Props & Model
    // ─────────────────────────────────────────────────────────────────────────

    pub fn props(&self) -> &EditorProps {
        &self.props
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn label(&self) -> Option<&str> {
        self.props.label.as_deref()
    }

    pub fn placeholder(&self) -> &str {
        &self.props.placeholder
    }

    pub fn is_disabled(&self) -> bool {
        self.props.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.props.disabled = disabled;
    }

    pub fn is_invalid(&self) -> bool {
        self.props.invalid
    }

    pub fn set_invalid(&mut self, invalid: bool) {
        self.props.invalid = invalid;
    }

    /// The current document.
    pub fn value(&self) -> &str {
        self.model.read()
    }

    /// Subscribe to document changes.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.model.on_change(listener);
    }

    /// Forward every change to the owning form.
    pub fn forward_to(&mut self, callback: impl FnMut(&str) + 'static) {
        self.model.forward_to(callback);
    }

    /// Replace the document from outside; the surface is re-materialized.
    pub fn set_value(&mut self, markup: &str) {
        self.deferred.retain(|task| *task != Deferred::Rematerialize);
        self.model.write(markup);
        if let Some(surface) = self.surface.as_mut() {
            surface.load(markup);
        }
        self.tracker.clear();
    }

    /// Empty the document and drop any pending insertion state.
    pub fn clear(&mut self) {
        self.dialog = None;
        self.set_value("");
    }

    /// Whether the placeholder should be shown.
    pub fn placeholder_visible(&self) -> bool {
        match &self.surface {
            Some(surface) if !self.deferred.contains(&Deferred::Rematerialize) => {
                surface.is_empty()
            }
            _ => Surface::from_markup(self.model.read()).is_empty(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Surface Access
    // ─────────────────────────────────────────────────────────────────────────

    /// The editing surface, once any pending re-materialization has run.
    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.flush_rematerialize();
        self.surface.as_mut()
    }

    /// The editing surface as it is right now. May still be awaiting
    /// re-materialization after a switch back to editing.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Whether editing operations are currently allowed.
    fn editable(&self) -> bool {
        !self.props.disabled && self.modes.mode() == Mode::Editing
    }

    fn flush_rematerialize(&mut self) {
        if !self.deferred.contains(&Deferred::Rematerialize) {
            return;
        }
        self.deferred.retain(|task| *task != Deferred::Rematerialize);
        self.rematerialize();
    }

    fn rematerialize(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.load(self.model.read());
            debug!("Surface re-materialized from model");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Modes
    // ─────────────────────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    /// Switch modes. Returns whether a transition happened.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        match mode {
            Mode::Previewing => {
                self.flush_rematerialize();
                self.dialog = None;
                self.tracker.clear();
                self.modes.enter_preview(&mut self.surface, &mut self.model)
            }
            Mode::Editing => {
                let entered = self.modes.enter_editing(&mut self.surface);
                if entered {
                    self.deferred.push_back(Deferred::Rematerialize);
                }
                entered
            }
        }
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode().toggle());
        self.mode()
    }

    /// The read-only view, always rendered from ContentModel.
    pub fn preview(&self) -> String {
        render_preview(self.model.read(), PreviewOptions::from(&self.settings))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Host Events
    // ─────────────────────────────────────────────────────────────────────────

    pub fn on_pointer_up(&mut self) {
        self.schedule_capture();
    }

    pub fn on_key_up(&mut self) {
        self.schedule_capture();
    }

    pub fn on_click(&mut self) {
        self.schedule_capture();
    }

    /// The user edited the surface directly; re-derive the model.
    pub fn on_input(&mut self) {
        self.flush_rematerialize();
        if let Some(surface) = &self.surface {
            self.model.write(surface.to_markup());
        }
    }

    fn schedule_capture(&mut self) {
        if self.deferred.back() != Some(&Deferred::CaptureSelection) {
            self.deferred.push_back(Deferred::CaptureSelection);
        }
    }

    /// Run deferred work. Returns the number of tasks run.
    pub fn tick(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.deferred.pop_front() {
            match task {
                Deferred::Rematerialize => self.rematerialize(),
                Deferred::CaptureSelection => {
                    if let Some(surface) = &self.surface {
                        self.tracker.capture(surface);
                    }
                }
            }
            ran += 1;
        }
        ran
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute a formatting command. Returns whether it was applied.
    ///
    /// A no-op while previewing or disabled. If the surface lost its
    /// selection, the last captured one is re-applied first.
    pub fn execute(&mut self, command: &Command) -> bool {
        if !self.editable() {
            return false;
        }
        self.flush_rematerialize();
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        if !surface.has_selection() {
            self.tracker.restore(surface, self.tracker.saved());
        }
        let applied =
            CommandExecutor::new(self.host.as_mut(), surface, &mut self.model).execute(command);
        self.tracker.capture(surface);
        applied
    }

    /// Execute a command by name. Unknown names are ignored.
    pub fn execute_named(&mut self, name: &str, value: Option<&str>) -> bool {
        match Command::from_name(name, value) {
            Some(command) => self.execute(&command),
            None => {
                debug!("Ignoring unknown command '{}'", name);
                false
            }
        }
    }

    /// Toggle a block format (quote, code block) on the selection's block.
    pub fn toggle_block(&mut self, tag: &str) -> Option<ToggleOutcome> {
        if !self.editable() {
            return None;
        }
        self.flush_rematerialize();
        let surface = self.surface.as_mut()?;
        if !surface.has_selection() {
            self.tracker.restore(surface, self.tracker.saved());
        }
        let outcome = {
            let mut executor = CommandExecutor::new(self.host.as_mut(), surface, &mut self.model);
            toggle_block(&mut executor, tag)
        };
        self.tracker.capture(surface);
        outcome
    }

    /// Insert a markup fragment at the saved selection.
    ///
    /// Without a saved selection the live one is used; without either the
    /// fragment is appended to the document.
    pub fn insert(&mut self, fragment: &str) -> Option<InsertionTier> {
        if self.props.disabled {
            return None;
        }
        self.flush_rematerialize();
        InsertionPipeline::new(self.host.as_mut(), &mut self.tracker, &mut self.model)
            .with_max_fragment_len(self.settings.max_fragment_len)
            .insert(self.surface.as_mut(), fragment)
    }

    /// Toolbar state at the selection.
    pub fn formatting_state(&self) -> FormattingState {
        self.surface
            .as_ref()
            .map(detect_formatting_state)
            .unwrap_or_default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────────────────────

    /// Open the link dialog. The selection is captured first, because
    /// moving focus to the dialog destroys it.
    pub fn open_link_dialog(&mut self) -> bool {
        let Some(selected) = self.prepare_dialog() else {
            return false;
        };
        self.dialog = Some(InsertionDialog::link(&selected));
        true
    }

    /// Open the image dialog, capturing the selection first.
    pub fn open_image_dialog(&mut self) -> bool {
        if self.prepare_dialog().is_none() {
            return false;
        }
        self.dialog = Some(InsertionDialog::image());
        true
    }

    /// Capture the selection and move focus away from the surface.
    /// Returns the selected text, or `None` if dialogs cannot open.
    fn prepare_dialog(&mut self) -> Option<String> {
        if !self.editable() {
            return None;
        }
        self.flush_rematerialize();
        let surface = self.surface.as_mut()?;
        let captured = self.tracker.capture(surface);
        let selected = surface.selected_text();
        surface.blur();
        debug!("Dialog opened (selection captured: {})", captured.is_some());
        Some(selected)
    }

    pub fn dialog(&self) -> Option<&InsertionDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut InsertionDialog> {
        self.dialog.as_mut()
    }

    /// Submit the open dialog.
    ///
    /// Invalid input keeps the dialog open and returns `Pending`. Valid input
    /// closes it, runs the insertion, and returns the inserted fragment.
    pub fn submit_dialog(&mut self) -> Option<DialogResult> {
        let dialog = self.dialog.as_mut()?;
        let result = dialog.submit(&self.settings);
        if let DialogResult::Insert(fragment) = &result {
            self.dialog = None;
            let tier = self.insert(fragment);
            info!("Dialog insertion completed via {:?}", tier);
        }
        Some(result)
    }

    /// Cancel the open dialog without side effects on the document.
    pub fn cancel_dialog(&mut self) -> Option<DialogResult> {
        let mut dialog = self.dialog.take()?;
        Some(dialog.cancel())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor(markup: &str) -> RichTextEditor {
        RichTextEditor::new(EditorProps::with_value(markup), EditorSettings::default())
    }

    fn recorder(editor: &mut RichTextEditor) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.on_change(move |v| sink.borrow_mut().push(v.to_string()));
        seen
    }

    #[test]
    fn test_mounts_with_initial_value() {
        let editor = editor("<p>hi</p>");
        assert_eq!(editor.value(), "<p>hi</p>");
        assert_eq!(editor.mode(), Mode::Editing);
        assert_eq!(editor.surface().unwrap().to_markup(), "<p>hi</p>");
    }

    #[test]
    fn test_mounts_in_preview_mode() {
        let settings = EditorSettings {
            default_mode: Mode::Previewing,
            ..EditorSettings::default()
        };
        let editor = RichTextEditor::new(EditorProps::with_value("<p>x</p>"), settings);
        assert!(editor.surface().is_none());
        assert_eq!(editor.preview(), "<p>x</p>");
    }

    #[test]
    fn test_execute_notifies_with_full_markup() {
        let mut editor = editor("<p>make bold</p>");
        let seen = recorder(&mut editor);
        editor.surface_mut().unwrap().select_text("bold");
        assert!(editor.execute(&Command::Bold));
        assert_eq!(*seen.borrow(), vec!["<p>make <b>bold</b></p>".to_string()]);
        assert_eq!(editor.value(), editor.surface().unwrap().to_markup());
    }

    #[test]
    fn test_execute_restores_captured_selection() {
        let mut editor = editor("<p>one two</p>");
        editor.surface_mut().unwrap().select_text("two");
        editor.on_pointer_up();
        editor.tick();
        editor.surface_mut().unwrap().blur();

        assert!(editor.execute_named("italic", None));
        assert_eq!(editor.value(), "<p>one <i>two</i></p>");
    }

    #[test]
    fn test_execute_noop_when_disabled_or_previewing() {
        let mut editor = editor("<p>x</p>");
        editor.surface_mut().unwrap().select_text("x");
        editor.set_disabled(true);
        assert!(!editor.execute(&Command::Bold));
        editor.set_disabled(false);

        editor.set_mode(Mode::Previewing);
        assert!(!editor.execute(&Command::Bold));
        assert_eq!(editor.toggle_block("blockquote"), None);
        assert!(!editor.open_link_dialog());
        assert_eq!(editor.value(), "<p>x</p>");
    }

    #[test]
    fn test_unknown_command_is_silent() {
        let mut editor = editor("<p>x</p>");
        let seen = recorder(&mut editor);
        assert!(!editor.execute_named("doSomethingElse", None));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_toggle_blockquote_on_empty_document() {
        let mut editor = editor("");
        editor.surface_mut().unwrap().caret_at_start();
        assert_eq!(editor.toggle_block("blockquote"), Some(ToggleOutcome::On));
        assert_eq!(editor.value(), "<blockquote></blockquote>");
        assert_eq!(editor.toggle_block("blockquote"), Some(ToggleOutcome::Off));
        assert_eq!(editor.value(), "<p></p>");
    }

    #[test]
    fn test_toggle_blockquote_in_empty_paragraph() {
        let mut editor = editor("<p></p>");
        let surface = editor.surface_mut().unwrap();
        let doc = surface.document();
        let paragraph = doc.children(doc.root())[0];
        surface.set_caret(crate::surface::Position::new(paragraph, 0));

        assert_eq!(editor.toggle_block("blockquote"), Some(ToggleOutcome::On));
        assert_eq!(editor.value(), "<blockquote></blockquote>");
        assert_eq!(editor.formatting_state().block_tag.as_deref(), Some("blockquote"));
        assert_eq!(editor.toggle_block("blockquote"), Some(ToggleOutcome::Off));
        assert_eq!(editor.value(), "<p></p>");
    }

    #[test]
    fn test_link_dialog_scenario() {
        let mut editor = editor("<p>this is a test</p>");
        editor.surface_mut().unwrap().select_text("test");
        editor.on_pointer_up();
        editor.tick();

        assert!(editor.open_link_dialog());
        assert!(!editor.surface().unwrap().has_selection());
        assert_eq!(editor.dialog().unwrap().label(), "test");
        editor.dialog_mut().unwrap().set_url("example.com");

        let result = editor.submit_dialog().unwrap();
        assert_eq!(
            result,
            DialogResult::Insert("<a href=\"https://example.com\">test</a>".to_string())
        );
        assert!(editor.dialog().is_none());
        assert_eq!(
            editor.value(),
            "<p>this is a <a href=\"https://example.com\">test</a></p>"
        );
    }

    #[test]
    fn test_insert_without_selection_appends() {
        let mut editor = editor("<p>existing</p>");
        let seen = recorder(&mut editor);
        assert_eq!(editor.insert("<img src='x.jpg'>"), Some(InsertionTier::Append));
        assert!(editor.value().ends_with("<img src=\"x.jpg\">"));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_image_dialog_empty_url_stays_open() {
        let mut editor = editor("<p>x</p>");
        let seen = recorder(&mut editor);
        assert!(editor.open_image_dialog());
        editor.dialog_mut().unwrap().set_label("alt");

        assert_eq!(editor.submit_dialog(), Some(DialogResult::Pending));
        assert!(editor.dialog().is_some());
        assert!(editor.dialog().unwrap().url_error().is_some());
        assert!(seen.borrow().is_empty());
        assert_eq!(editor.value(), "<p>x</p>");
    }

    #[test]
    fn test_cancel_dialog_has_no_side_effects() {
        let mut editor = editor("<p>x</p>");
        let seen = recorder(&mut editor);
        editor.open_image_dialog();
        editor.dialog_mut().unwrap().set_url("x.png");
        assert_eq!(editor.cancel_dialog(), Some(DialogResult::Cancelled));
        assert!(editor.dialog().is_none());
        assert_eq!(editor.cancel_dialog(), None);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_preview_reflects_unsynced_edits() {
        let mut editor = editor("<p>draft</p>");
        let surface = editor.surface_mut().unwrap();
        surface.caret_at_end();
        surface.type_text(" v2");
        assert_eq!(editor.value(), "<p>draft</p>");

        editor.set_mode(Mode::Previewing);
        assert_eq!(editor.value(), "<p>draft v2</p>");
        assert_eq!(editor.preview(), "<p>draft v2</p>");
    }

    #[test]
    fn test_mode_roundtrip_is_identity() {
        let documents = [
            "",
            "<p>plain</p>",
            "<h1>T</h1><ul><li>a</li><li><b>b</b></li></ul><blockquote><p>q</p></blockquote>",
            "<p style=\"text-align: center\"><font size=\"3\" color=\"red\">c</font>\
             <img src=\"i.png\" alt=\"i\"></p>",
            "<p>caf\u{e9} 你好 🎉&nbsp;&lt;&amp;&gt; — …</p><p>&zwsp;</p>",
        ];
        for doc in documents {
            let mut editor = editor(doc);
            roundtrip(&mut editor);
            assert_eq!(editor.value(), doc);
            assert_eq!(editor.surface().unwrap().to_markup(), doc);
        }
    }

    fn roundtrip(editor: &mut RichTextEditor) {
        editor.toggle_mode();
        editor.toggle_mode();
        editor.tick();
        editor.on_input();
    }

    #[test]
    fn test_mode_roundtrip_decodes_named_references_once() {
        let cases = [
            ("<p>a&hellip;</p>", "<p>a…</p>"),
            ("<p>&copy; 2024 &mdash; &eacute;t&eacute;</p>", "<p>© 2024 — été</p>"),
            ("<p>&amp;hellip; &lt;b&gt;</p>", "<p>&amp;hellip; &lt;b&gt;</p>"),
        ];
        for (doc, canonical) in cases {
            let mut editor = editor(doc);
            roundtrip(&mut editor);
            assert_eq!(editor.value(), canonical);
            roundtrip(&mut editor);
            assert_eq!(editor.value(), canonical);
        }
    }

    #[test]
    fn test_rematerialize_is_deferred_but_flushed_on_use() {
        let mut editor = editor("<p>a</p>");
        editor.set_mode(Mode::Previewing);
        editor.set_mode(Mode::Editing);
        assert_eq!(editor.surface().unwrap().to_markup(), "");
        assert_eq!(editor.surface_mut().unwrap().to_markup(), "<p>a</p>");
        assert_eq!(editor.tick(), 0);
    }

    #[test]
    fn test_external_value_survives_preview() {
        let mut editor = editor("<p>a</p>");
        editor.set_mode(Mode::Previewing);
        editor.set_value("<p>from server</p>");
        editor.set_mode(Mode::Editing);
        assert_eq!(editor.tick(), 1);
        assert_eq!(editor.surface().unwrap().to_markup(), "<p>from server</p>");
    }

    #[test]
    fn test_on_input_syncs_model() {
        let mut editor = editor("<p>a</p>");
        let seen = recorder(&mut editor);
        let surface = editor.surface_mut().unwrap();
        surface.caret_at_end();
        surface.type_text("b");
        editor.on_input();
        assert_eq!(*seen.borrow(), vec!["<p>ab</p>".to_string()]);
    }

    #[test]
    fn test_capture_is_deferred_to_tick() {
        let mut editor = editor("<p>abc</p>");
        editor.surface_mut().unwrap().select_text("b");
        editor.on_key_up();
        editor.on_click();
        editor.surface_mut().unwrap().blur();
        assert_eq!(editor.tick(), 1);
        assert!(editor.insert("<i>!</i>").is_some());
        assert_eq!(editor.value(), "<p>abc</p><i>!</i>");
    }

    #[test]
    fn test_clear_and_placeholder() {
        let mut editor = editor("<p>a</p>");
        assert!(!editor.placeholder_visible());
        editor.open_link_dialog();
        editor.clear();
        assert_eq!(editor.value(), "");
        assert!(editor.dialog().is_none());
        assert!(editor.placeholder_visible());
    }

    #[test]
    fn test_forward_to_form() {
        let form = Rc::new(RefCell::new(String::new()));
        let mut editor = editor("<p>a</p>");
        let sink = Rc::clone(&form);
        editor.forward_to(move |v| *sink.borrow_mut() = v.to_string());
        editor.surface_mut().unwrap().select_text("a");
        editor.execute(&Command::FormatBlock("h2".to_string()));
        assert_eq!(*form.borrow(), "<h2>a</h2>");
    }

    #[test]
    fn test_formatting_state_follows_selection() {
        let mut editor = editor("<p><b>x</b> y</p>");
        assert_eq!(editor.formatting_state(), FormattingState::default());
        editor.surface_mut().unwrap().select_text("x");
        assert!(editor.formatting_state().is_bold);
    }
}
