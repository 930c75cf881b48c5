//! The editing engine
//!
//! The pieces the editor component is assembled from:
//! - `ContentModel`: the authoritative markup string
//! - `SelectionTracker`: capture/restore of the surface selection
//! - `CommandExecutor`: formatting commands through an `EditingHost`
//! - `InsertionPipeline`: native → manual → append fragment insertion
//! - `toggle_block`: ancestry-driven block format toggling
//! - `ModeController`: editing/previewing transitions
//!
//! All of it is synchronous and single-threaded.

mod command;
mod content;
mod executor;
mod formatter;
mod host;
mod insertion;
mod mode;
mod selection;
mod state;
mod toggle;

pub use command::{Alignment, Command, BLOCK_FORMATS};
pub use content::{ChangeListener, ContentModel};
pub use executor::CommandExecutor;
pub use host::{BuiltinHost, EditingHost};
pub use insertion::{InsertionPipeline, InsertionTier};
pub use mode::{Mode, ModeController};
pub use selection::SelectionTracker;
pub use state::{detect_formatting_state, FormattingState, ListKind};
pub use toggle::{block_membership, toggle_block, ToggleOutcome};
