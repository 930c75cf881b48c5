//! Link and image insertion dialogs.
//!
//! A dialog holds the pending insertion request while it is open. On
//! submit the fields are validated, the URL is normalized, and the markup
//! fragment for the insertion pipeline is built. Invalid input keeps the
//! dialog open with a message per field.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::EditorSettings;
use crate::markup::{escape_attr, escape_text};

static SCHEME_RE: OnceLock<Regex> = OnceLock::new();
static LINK_RE: OnceLock<Regex> = OnceLock::new();

fn scheme_regex() -> &'static Regex {
    SCHEME_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("scheme pattern is valid")
    })
}

/// A domain (optionally with scheme, port and path) or a rooted/relative path.
fn link_regex() -> &'static Regex {
    LINK_RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?:[a-zA-Z][a-zA-Z0-9+.-]*://)?(?:localhost|[\w-]+(?:\.[\w-]+)+|\d{1,3}(?:\.\d{1,3}){3})(?::\d{1,5})?(?:[/?#]\S*)?|\.{0,2}/\S*)$",
        )
        .expect("link pattern is valid")
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// URL Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Prefix `scheme://` when the URL has no scheme. Paths are left alone.
pub fn normalize_url(input: &str, scheme: &str) -> String {
    let url = input.trim();
    if url.is_empty()
        || scheme_regex().is_match(url)
        || url.starts_with('/')
        || url.starts_with('.')
    {
        url.to_string()
    } else {
        format!("{}://{}", scheme, url)
    }
}

/// Whether the input looks like a domain or a path.
pub fn looks_like_link(input: &str) -> bool {
    link_regex().is_match(input.trim())
}

/// Whether the input looks like a domain/path or ends in an image file suffix.
pub fn looks_like_image(input: &str, extensions: &[String]) -> bool {
    let url = input.trim();
    if looks_like_link(url) {
        return true;
    }
    if url.chars().any(char::is_whitespace) {
        return false;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty() && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    })
}

/// Anchor fragment for a link.
pub fn link_fragment(url: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_attr(url), escape_text(text))
}

/// Image fragment.
pub fn image_fragment(url: &str, alt: &str) -> String {
    format!("<img src=\"{}\" alt=\"{}\">", escape_attr(url), escape_attr(alt))
}

// ─────────────────────────────────────────────────────────────────────────────
// Dialog State
// ─────────────────────────────────────────────────────────────────────────────

/// State for an open insertion dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionDialog {
    /// Insert a link
    Link {
        url_input: String,
        text_input: String,
        url_error: Option<String>,
        text_error: Option<String>,
    },
    /// Insert an image
    Image {
        url_input: String,
        alt_input: String,
        url_error: Option<String>,
        alt_error: Option<String>,
    },
}

/// Result of a dialog interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResult {
    /// Dialog still open (validation failed)
    Pending,
    /// Dialog was cancelled
    Cancelled,
    /// Insert this fragment
    Insert(String),
}

impl InsertionDialog {
    /// Create a "Insert Link" dialog. The link text starts as the selected text.
    pub fn link(selected_text: &str) -> Self {
        Self::Link {
            url_input: String::new(),
            text_input: selected_text.to_string(),
            url_error: None,
            text_error: None,
        }
    }

    /// Create an "Insert Image" dialog.
    pub fn image() -> Self {
        Self::Image {
            url_input: String::new(),
            alt_input: String::new(),
            url_error: None,
            alt_error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Link { .. } => "Insert Link",
            Self::Image { .. } => "Insert Image",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Link { url_input, .. } | Self::Image { url_input, .. } => url_input,
        }
    }

    /// The link text or the image alt text.
    pub fn label(&self) -> &str {
        match self {
            Self::Link { text_input, .. } => text_input,
            Self::Image { alt_input, .. } => alt_input,
        }
    }

    pub fn set_url(&mut self, value: &str) {
        match self {
            Self::Link { url_input, .. } | Self::Image { url_input, .. } => {
                *url_input = value.to_string()
            }
        }
    }

    pub fn set_label(&mut self, value: &str) {
        match self {
            Self::Link { text_input, .. } => *text_input = value.to_string(),
            Self::Image { alt_input, .. } => *alt_input = value.to_string(),
        }
    }

    /// Accept a URL from the upload widget. An empty URL (file removed)
    /// clears the field. Link dialogs ignore uploads.
    pub fn set_uploaded_url(&mut self, url: &str) {
        if let Self::Image {
            url_input,
            url_error,
            ..
        } = self
        {
            *url_input = url.trim().to_string();
            *url_error = None;
        }
    }

    pub fn url_error(&self) -> Option<&str> {
        match self {
            Self::Link { url_error, .. } | Self::Image { url_error, .. } => url_error.as_deref(),
        }
    }

    pub fn label_error(&self) -> Option<&str> {
        match self {
            Self::Link { text_error, .. } => text_error.as_deref(),
            Self::Image { alt_error, .. } => alt_error.as_deref(),
        }
    }

    /// Validate and build the fragment.
    ///
    /// Returns `Pending` with per-field errors set when the input is invalid.
    pub fn submit(&mut self, settings: &EditorSettings) -> DialogResult {
        let scheme = settings.default_url_scheme.as_str();
        match self {
            Self::Link {
                url_input,
                text_input,
                url_error,
                text_error,
            } => {
                *url_error = validate_url(
                    url_input,
                    looks_like_link,
                    "Enter a valid URL (e.g. example.com)",
                );
                *text_error = required(text_input, "Link text is required");
                if url_error.is_some() || text_error.is_some() {
                    return DialogResult::Pending;
                }
                let url = normalize_url(url_input, scheme);
                DialogResult::Insert(link_fragment(&url, text_input.trim()))
            }
            Self::Image {
                url_input,
                alt_input,
                url_error,
                alt_error,
            } => {
                let extensions = &settings.image_extensions;
                *url_error = validate_url(
                    url_input,
                    |u| looks_like_image(u, extensions),
                    "Enter a valid image URL or file name",
                );
                *alt_error = required(alt_input, "Alt text is required");
                if url_error.is_some() || alt_error.is_some() {
                    return DialogResult::Pending;
                }
                let url = normalize_url(url_input, scheme);
                DialogResult::Insert(image_fragment(&url, alt_input.trim()))
            }
        }
    }

    /// Clear every field and error.
    pub fn cancel(&mut self) -> DialogResult {
        *self = match self {
            Self::Link { .. } => Self::link(""),
            Self::Image { .. } => Self::image(),
        };
        DialogResult::Cancelled
    }
}

fn required(value: &str, message: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(message.to_string())
    } else {
        None
    }
}

fn validate_url<F>(value: &str, looks_valid: F, message: &str) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    if value.trim().is_empty() {
        Some("URL is required".to_string())
    } else if !looks_valid(value) {
        Some(message.to_string())
    } else {
        None
    }
}
