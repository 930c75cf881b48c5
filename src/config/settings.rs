//! Editor settings for Lectern
//!
//! This module defines the `EditorSettings` struct that holds the engine's
//! tunable behavior, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};

use crate::engine::Mode;

/// Image file suffixes accepted by the image dialog when the URL does not
/// otherwise look like a domain/path.
const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

/// Engine settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Mode & Preview
    // ─────────────────────────────────────────────────────────────────────────
    /// Mode a freshly mounted editor starts in
    pub default_mode: Mode,

    /// Strip active content (scripts, event handlers, script URLs) from the
    /// read-only preview. ContentModel itself is never altered.
    pub sanitize_preview: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Insertion
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether the host advertises native rich-content insertion (tier 1)
    pub native_insertion: bool,

    /// Reject restoring a range captured before the last structural change,
    /// instead of best-effort re-application of anchors that still resolve
    pub strict_range_validation: bool,

    /// Upper bound on the size of an inserted fragment, in bytes
    pub max_fragment_len: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────────────────────
    /// Scheme prefixed to URLs entered without one
    pub default_url_scheme: String,

    /// Image file suffixes accepted by the image dialog
    pub image_extensions: Vec<String>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_mode: Mode::Editing,
            sanitize_preview: true,
            native_insertion: true,
            strict_range_validation: false,
            max_fragment_len: 64 * 1024,
            default_url_scheme: String::from("https"),
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl EditorSettings {
    /// Smallest allowed fragment limit.
    pub const MIN_FRAGMENT_LEN: usize = 256;
    /// Largest allowed fragment limit.
    pub const MAX_FRAGMENT_LEN: usize = 4 * 1024 * 1024;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.max_fragment_len = self
            .max_fragment_len
            .clamp(Self::MIN_FRAGMENT_LEN, Self::MAX_FRAGMENT_LEN);

        // Only web schemes make sense as a default prefix
        let scheme = self.default_url_scheme.trim().to_ascii_lowercase();
        self.default_url_scheme = match scheme.as_str() {
            "http" | "https" => scheme,
            _ => String::from("https"),
        };

        self.image_extensions = self
            .image_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .collect();
        self.image_extensions.dedup();
        if self.image_extensions.is_empty() {
            self.image_extensions = Self::default().image_extensions;
        }
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert_eq!(settings.default_mode, Mode::Editing);
        assert!(settings.sanitize_preview);
        assert!(settings.native_insertion);
        assert!(!settings.strict_range_validation);
        assert_eq!(settings.default_url_scheme, "https");
        assert!(settings.image_extensions.contains(&"png".to_string()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: EditorSettings =
            serde_json::from_str(r#"{"default_mode": "previewing"}"#).unwrap();
        assert_eq!(settings.default_mode, Mode::Previewing);
        assert!(settings.sanitize_preview);
    }

    #[test]
    fn test_sanitize_clamps_fragment_len() {
        let settings = EditorSettings::from_json_sanitized(r#"{"max_fragment_len": 3}"#).unwrap();
        assert_eq!(settings.max_fragment_len, EditorSettings::MIN_FRAGMENT_LEN);
    }

    #[test]
    fn test_sanitize_rejects_unknown_scheme() {
        let settings =
            EditorSettings::from_json_sanitized(r#"{"default_url_scheme": "javascript"}"#)
                .unwrap();
        assert_eq!(settings.default_url_scheme, "https");

        let settings =
            EditorSettings::from_json_sanitized(r#"{"default_url_scheme": " HTTP "}"#).unwrap();
        assert_eq!(settings.default_url_scheme, "http");
    }

    #[test]
    fn test_sanitize_normalizes_extensions() {
        let settings =
            EditorSettings::from_json_sanitized(r#"{"image_extensions": [".PNG", "", "j pg"]}"#)
                .unwrap();
        assert_eq!(settings.image_extensions, vec!["png".to_string()]);

        let settings =
            EditorSettings::from_json_sanitized(r#"{"image_extensions": []}"#).unwrap();
        assert_eq!(
            settings.image_extensions,
            EditorSettings::default().image_extensions
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let result: Result<EditorSettings, _> =
            serde_json::from_str(r#"{"sanitize_preview": false, "future_feature": true}"#);
        assert!(!result.unwrap().sanitize_preview);
    }
}
