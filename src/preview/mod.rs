//! Read-only preview rendering
//!
//! The preview view is always rendered from ContentModel, never from the
//! surface. Sanitization applies to the rendered view only.

mod sanitize;

pub use sanitize::sanitize_markup;

use crate::config::EditorSettings;

/// How the preview is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Strip active content from the rendered view
    pub sanitize: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self { sanitize: true }
    }
}

impl From<&EditorSettings> for PreviewOptions {
    fn from(settings: &EditorSettings) -> Self {
        Self {
            sanitize: settings.sanitize_preview,
        }
    }
}

/// Render the preview body for `markup`.
///
/// Without sanitization the markup is passed through as-is.
pub fn render_preview(markup: &str, options: PreviewOptions) -> String {
    if options.sanitize {
        sanitize_markup(markup)
    } else {
        markup.to_string()
    }
}

/// Base CSS for standalone documents.
const PREVIEW_CSS: &str = r#"body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
    line-height: 1.6;
    color: #24292f;
    background-color: #ffffff;
}
.lectern-preview {
    max-width: 860px;
    margin: 0 auto;
    padding: 32px;
}
blockquote {
    margin: 0 0 16px 0;
    padding: 0 1em;
    color: #57606a;
    border-left: 0.25em solid #d0d7de;
}
pre {
    padding: 16px;
    overflow: auto;
    background-color: #f6f8fa;
    border-radius: 6px;
}
img {
    max-width: 100%;
}"#;

/// Wrap the rendered preview into a complete HTML document.
pub fn standalone_document(markup: &str, title: Option<&str>, options: PreviewOptions) -> String {
    let body = render_preview(markup, options);
    let doc_title = title.unwrap_or("Untitled Document");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="Lectern">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <article class="lectern-preview">
{body}
    </article>
</body>
</html>"#,
        title = html_escape(doc_title),
        css = PREVIEW_CSS,
        body = body,
    )
}

/// HTML-escape a string.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_preview_sanitizes_by_default() {
        let markup = "<p onclick=\"x()\">hi</p>";
        assert_eq!(render_preview(markup, PreviewOptions::default()), "<p>hi</p>");
    }

    #[test]
    fn test_render_preview_passthrough() {
        let markup = "<p onclick=\"x()\">hi</P>";
        assert_eq!(render_preview(markup, PreviewOptions { sanitize: false }), markup);
    }

    #[test]
    fn test_options_from_settings() {
        let mut settings = EditorSettings::default();
        assert!(PreviewOptions::from(&settings).sanitize);
        settings.sanitize_preview = false;
        assert!(!PreviewOptions::from(&settings).sanitize);
    }

    #[test]
    fn test_standalone_document() {
        let html = standalone_document(
            "<h1>Hi</h1>",
            Some("Notes & <Drafts>"),
            PreviewOptions::default(),
        );
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Notes &amp; &lt;Drafts&gt;</title>"));
        assert!(html.contains("<article class=\"lectern-preview\">"));
        assert!(html.contains("<h1>Hi</h1>"));

        let untitled = standalone_document("", None, PreviewOptions::default());
        assert!(untitled.contains("<title>Untitled Document</title>"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("Hello"), "Hello");
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("it's"), "it&#39;s");
    }
}
