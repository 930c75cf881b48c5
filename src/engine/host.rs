//! The host command facility.
//!
//! `EditingHost` is the seam between the engine and whatever actually
//! performs formatting: a platform's native editing primitives, or the
//! built-in formatter working directly on the surface tree.

use log::debug;

use super::command::Command;
use super::formatter;
use crate::error::{Error, Result};
use crate::surface::Surface;

/// Native formatting and insertion primitives of an execution environment.
pub trait EditingHost {
    /// Whether `command` can be executed at all.
    fn supports(&self, command: &Command) -> bool;

    /// Execute `command` on the surface's live selection.
    fn exec(&mut self, surface: &mut Surface, command: &Command) -> Result<()>;

    /// Whether the host can insert a markup fragment as rich content.
    fn supports_insert_html(&self) -> bool;

    /// Insert a markup fragment at the surface's live selection.
    fn insert_html(&mut self, surface: &mut Surface, fragment: &str) -> Result<()>;
}

/// Host backed by the built-in formatter.
///
/// Supports every command. Native insertion can be switched off so that
/// the insertion pipeline falls through to its manual tiers.
#[derive(Debug, Clone)]
pub struct BuiltinHost {
    native_insertion: bool,
}

impl Default for BuiltinHost {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BuiltinHost {
    pub fn new(native_insertion: bool) -> Self {
        Self { native_insertion }
    }
}

impl EditingHost for BuiltinHost {
    fn supports(&self, _command: &Command) -> bool {
        true
    }

    fn exec(&mut self, surface: &mut Surface, command: &Command) -> Result<()> {
        formatter::apply(surface, command)
    }

    fn supports_insert_html(&self) -> bool {
        self.native_insertion
    }

    fn insert_html(&mut self, surface: &mut Surface, fragment: &str) -> Result<()> {
        if !self.native_insertion {
            return Err(Error::UnsupportedCommand("insertHTML".to_string()));
        }
        if !surface.is_focused() {
            return Err(Error::NoSelection);
        }
        surface.replace_selection_with_markup(fragment)?;
        debug!("Native insertion of {} bytes", fragment.len());
        Ok(())
    }
}
