//! Configuration module for Lectern
//!
//! This module handles engine settings, including serialization to/from
//! JSON and persistent storage in the platform-specific config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
