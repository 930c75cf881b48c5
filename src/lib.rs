//! Lectern - rich-text editing engine
//!
//! The editor component, its editing engine, and the markup tree the
//! editing surface is built on.

pub mod config;
pub mod dialogs;
pub mod editor;
pub mod engine;
pub mod error;
pub mod markup;
pub mod preview;
pub mod string_utils;
pub mod surface;

pub use config::EditorSettings;
pub use dialogs::{DialogResult, InsertionDialog};
pub use editor::{EditorProps, RichTextEditor};
pub use engine::{Command, Mode};
pub use error::{Error, Result};
