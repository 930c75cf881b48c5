//! CommandExecutor: run a command, then re-derive ContentModel.

use log::debug;

use super::command::Command;
use super::content::ContentModel;
use super::host::EditingHost;
use crate::surface::Surface;

/// Applies commands to a surface through a host and keeps the model in sync.
///
/// Whatever the host does (or fails to do), the model is rewritten from
/// the surface afterwards, so it always equals the surface's markup.
pub struct CommandExecutor<'a> {
    host: &'a mut dyn EditingHost,
    surface: &'a mut Surface,
    model: &'a mut ContentModel,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(
        host: &'a mut dyn EditingHost,
        surface: &'a mut Surface,
        model: &'a mut ContentModel,
    ) -> Self {
        Self {
            host,
            surface,
            model,
        }
    }

    pub fn surface(&self) -> &Surface {
        self.surface
    }

    /// Execute a command. Returns whether the host applied it.
    ///
    /// Unsupported or failing commands are silent no-ops.
    pub fn execute(&mut self, command: &Command) -> bool {
        self.surface.focus();
        let applied = if !self.host.supports(command) {
            debug!("Host does not support '{}'", command.name());
            false
        } else {
            match self.host.exec(self.surface, command) {
                Ok(()) => true,
                Err(err) => {
                    debug!("'{}' not applied: {}", command.name(), err);
                    false
                }
            }
        };
        self.sync();
        applied
    }

    /// Execute a command by name, the way a toolbar issues it.
    pub fn execute_named(&mut self, name: &str, value: Option<&str>) -> bool {
        match Command::from_name(name, value) {
            Some(command) => self.execute(&command),
            None => {
                debug!("Ignoring unknown command '{}' ({:?})", name, value);
                false
            }
        }
    }

    /// Run a structural change directly on the surface, then sync.
    pub fn mutate<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Surface),
    {
        self.surface.focus();
        f(self.surface);
        self.sync();
    }

    fn sync(&mut self) {
        self.model.write(self.surface.to_markup());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::host::BuiltinHost;
    use crate::error::Result;

    /// A host with no command support at all.
    struct InertHost;

    impl EditingHost for InertHost {
        fn supports(&self, _command: &Command) -> bool {
            false
        }
        fn exec(&mut self, _surface: &mut Surface, _command: &Command) -> Result<()> {
            unreachable!("exec called on unsupported command")
        }
        fn supports_insert_html(&self) -> bool {
            false
        }
        fn insert_html(&mut self, _surface: &mut Surface, _fragment: &str) -> Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn test_execute_syncs_model() {
        let mut host = BuiltinHost::default();
        let mut surface = Surface::from_markup("<p>make bold</p>");
        let mut model = ContentModel::new("<p>make bold</p>");
        surface.select_text("bold");

        let mut executor = CommandExecutor::new(&mut host, &mut surface, &mut model);
        assert!(executor.execute(&Command::Bold));
        assert_eq!(model.read(), "<p>make <b>bold</b></p>");
        assert_eq!(model.read(), surface.to_markup());
    }

    #[test]
    fn test_execute_picks_up_direct_edits() {
        let mut host = BuiltinHost::default();
        let mut surface = Surface::from_markup("<p>a</p>");
        let mut model = ContentModel::new("<p>a</p>");
        surface.caret_at_end();
        surface.type_text("bc");
        surface.select_text("abc");

        CommandExecutor::new(&mut host, &mut surface, &mut model).execute(&Command::Italic);
        assert_eq!(model.read(), "<p><i>abc</i></p>");
    }

    #[test]
    fn test_unsupported_command_is_silent_noop() {
        let mut host = InertHost;
        let mut surface = Surface::from_markup("<p>x</p>");
        let mut model = ContentModel::new("stale");
        surface.select_text("x");

        let mut executor = CommandExecutor::new(&mut host, &mut surface, &mut model);
        assert!(!executor.execute(&Command::Bold));
        assert_eq!(model.read(), "<p>x</p>");
    }

    #[test]
    fn test_execute_without_selection_still_syncs() {
        let mut host = BuiltinHost::default();
        let mut surface = Surface::from_markup("<p>x</p>");
        let mut model = ContentModel::default();
        let mut executor = CommandExecutor::new(&mut host, &mut surface, &mut model);
        assert!(!executor.execute(&Command::Underline));
        assert!(surface.is_focused());
        assert_eq!(model.read(), "<p>x</p>");
    }

    #[test]
    fn test_execute_named() {
        let mut host = BuiltinHost::default();
        let mut surface = Surface::from_markup("<p>x</p>");
        let mut model = ContentModel::default();
        surface.select_text("x");
        let mut executor = CommandExecutor::new(&mut host, &mut surface, &mut model);
        assert!(executor.execute_named("formatBlock", Some("<h3>")));
        assert!(!executor.execute_named("insertBrokenThing", None));
        assert_eq!(model.read(), "<h3>x</h3>");
    }

    #[test]
    fn test_mutate_syncs() {
        let mut host = BuiltinHost::default();
        let mut surface = Surface::from_markup("<p>x</p>");
        let mut model = ContentModel::default();
        CommandExecutor::new(&mut host, &mut surface, &mut model)
            .mutate(|s| s.append_markup("<hr>"));
        assert_eq!(model.read(), "<p>x</p><hr>");
    }
}
