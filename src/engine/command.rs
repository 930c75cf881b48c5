//! Formatting commands
//!
//! Commands are addressed by name (`bold`, `formatBlock`, `foreColor`, ...)
//! with an optional value, the way a toolbar or a script would issue them.
//! `Command::from_name` turns that pair into a typed command; names or values
//! it does not understand yield `None`, which callers treat as a silent no-op.

// ─────────────────────────────────────────────────────────────────────────────
// Alignment
// ─────────────────────────────────────────────────────────────────────────────

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Right,
    Center,
    Full,
}

impl Alignment {
    /// Value of the `text-align` property.
    pub fn css_value(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
            Alignment::Center => "center",
            Alignment::Full => "justify",
        }
    }

    /// Parse a `text-align` value.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "right" | "end" => Some(Alignment::Right),
            "center" => Some(Alignment::Center),
            "justify" => Some(Alignment::Full),
            _ => None,
        }
    }
}

/// Tags `formatBlock` accepts.
pub const BLOCK_FORMATS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "div",
    "address",
];

// ─────────────────────────────────────────────────────────────────────────────
// Command Enum
// ─────────────────────────────────────────────────────────────────────────────

/// An atomic formatting operation on the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bold (`<b>`)
    Bold,
    /// Italic (`<i>`)
    Italic,
    /// Underline (`<u>`)
    Underline,
    /// Strikethrough (`<s>`)
    StrikeThrough,
    /// Change the block type of every touched block
    FormatBlock(String),
    /// Font size on the legacy 1-7 scale
    FontSize(u8),
    /// Text color
    ForeColor(String),
    /// Highlight color
    BackColor(String),
    /// Paragraph alignment
    Justify(Alignment),
    /// Numbered list
    InsertOrderedList,
    /// Bullet list
    InsertUnorderedList,
    /// Strip inline styling
    RemoveFormat,
    /// Remove links
    Unlink,
}

impl Command {
    /// Build a command from its name and optional value.
    ///
    /// Names are matched case-insensitively. `formatBlock` accepts its tag
    /// with or without angle brackets; `fontSize` clamps to 1-7.
    pub fn from_name(name: &str, value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        let command = match name.trim().to_ascii_lowercase().as_str() {
            "bold" => Command::Bold,
            "italic" => Command::Italic,
            "underline" => Command::Underline,
            "strikethrough" => Command::StrikeThrough,
            "formatblock" => {
                let tag = value?
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_ascii_lowercase();
                if !BLOCK_FORMATS.contains(&tag.as_str()) {
                    return None;
                }
                Command::FormatBlock(tag)
            }
            "fontsize" => {
                let size: i64 = value?.parse().ok()?;
                Command::FontSize(size.clamp(1, 7) as u8)
            }
            "forecolor" => Command::ForeColor(value?.to_string()),
            "backcolor" | "hilitecolor" => Command::BackColor(value?.to_string()),
            "justifyleft" => Command::Justify(Alignment::Left),
            "justifyright" => Command::Justify(Alignment::Right),
            "justifycenter" => Command::Justify(Alignment::Center),
            "justifyfull" => Command::Justify(Alignment::Full),
            "insertorderedlist" => Command::InsertOrderedList,
            "insertunorderedlist" => Command::InsertUnorderedList,
            "removeformat" => Command::RemoveFormat,
            "unlink" => Command::Unlink,
            _ => return None,
        };
        Some(command)
    }

    /// Canonical command name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::StrikeThrough => "strikeThrough",
            Self::FormatBlock(_) => "formatBlock",
            Self::FontSize(_) => "fontSize",
            Self::ForeColor(_) => "foreColor",
            Self::BackColor(_) => "backColor",
            Self::Justify(Alignment::Left) => "justifyLeft",
            Self::Justify(Alignment::Right) => "justifyRight",
            Self::Justify(Alignment::Center) => "justifyCenter",
            Self::Justify(Alignment::Full) => "justifyFull",
            Self::InsertOrderedList => "insertOrderedList",
            Self::InsertUnorderedList => "insertUnorderedList",
            Self::RemoveFormat => "removeFormat",
            Self::Unlink => "unlink",
        }
    }

    /// The value carried by the command, if any.
    pub fn value(&self) -> Option<String> {
        match self {
            Self::FormatBlock(tag) => Some(tag.clone()),
            Self::FontSize(size) => Some(size.to_string()),
            Self::ForeColor(color) | Self::BackColor(color) => Some(color.clone()),
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Toolbar Metadata
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the keyboard shortcut label for this command.
    pub fn shortcut_label(&self) -> &'static str {
        match self {
            Self::Bold => "Ctrl+B",
            Self::Italic => "Ctrl+I",
            Self::Underline => "Ctrl+U",
            Self::StrikeThrough => "Ctrl+Shift+X",
            Self::FormatBlock(tag) => match tag.as_str() {
                "p" => "Ctrl+0",
                "h1" => "Ctrl+1",
                "h2" => "Ctrl+2",
                "h3" => "Ctrl+3",
                "h4" => "Ctrl+4",
                "h5" => "Ctrl+5",
                "h6" => "Ctrl+6",
                "blockquote" => "Ctrl+Q",
                "pre" => "Ctrl+Shift+C",
                _ => "",
            },
            Self::Justify(Alignment::Left) => "Ctrl+L",
            Self::Justify(Alignment::Center) => "Ctrl+E",
            Self::Justify(Alignment::Right) => "Ctrl+R",
            Self::Justify(Alignment::Full) => "Ctrl+J",
            Self::InsertOrderedList => "Ctrl+Shift+7",
            Self::InsertUnorderedList => "Ctrl+Shift+8",
            Self::RemoveFormat => "Ctrl+\\",
            Self::FontSize(_) | Self::ForeColor(_) | Self::BackColor(_) | Self::Unlink => "",
        }
    }

    /// Get the icon for this command.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Bold => "𝐁",
            Self::Italic => "𝐼",
            Self::Underline => "U̲",
            Self::StrikeThrough => "S̶",
            Self::FormatBlock(tag) => match tag.as_str() {
                "h1" => "H1",
                "h2" => "H2",
                "h3" => "H3",
                "h4" => "H4",
                "h5" => "H5",
                "h6" => "H6",
                "blockquote" => "\u{275D}", // heavy double turned comma quotation mark ❝
                "pre" => "{ }",
                _ => "¶",
            },
            Self::FontSize(_) => "A↕",
            Self::ForeColor(_) => "A",
            Self::BackColor(_) => "🖍",
            Self::Justify(Alignment::Left) => "⇤",
            Self::Justify(Alignment::Center) => "↔",
            Self::Justify(Alignment::Right) => "⇥",
            Self::Justify(Alignment::Full) => "☰",
            Self::InsertOrderedList => "1.",
            Self::InsertUnorderedList => "\u{2022}", // bullet •
            Self::RemoveFormat => "T̸",
            Self::Unlink => "⛓",
        }
    }

    /// Get the tooltip text for this command.
    pub fn tooltip(&self) -> String {
        let name = match self {
            Self::Bold => "Bold".to_string(),
            Self::Italic => "Italic".to_string(),
            Self::Underline => "Underline".to_string(),
            Self::StrikeThrough => "Strikethrough".to_string(),
            Self::FormatBlock(tag) => match tag.as_str() {
                "p" => "Paragraph".to_string(),
                "blockquote" => "Quote".to_string(),
                "pre" => "Code Block".to_string(),
                "div" => "Division".to_string(),
                "address" => "Address".to_string(),
                heading => format!("Heading {}", heading.trim_start_matches('h')),
            },
            Self::FontSize(size) => format!("Font Size {}", size),
            Self::ForeColor(_) => "Text Color".to_string(),
            Self::BackColor(_) => "Highlight Color".to_string(),
            Self::Justify(Alignment::Left) => "Align Left".to_string(),
            Self::Justify(Alignment::Center) => "Align Center".to_string(),
            Self::Justify(Alignment::Right) => "Align Right".to_string(),
            Self::Justify(Alignment::Full) => "Justify".to_string(),
            Self::InsertOrderedList => "Numbered List".to_string(),
            Self::InsertUnorderedList => "Bullet List".to_string(),
            Self::RemoveFormat => "Clear Formatting".to_string(),
            Self::Unlink => "Remove Link".to_string(),
        };
        let shortcut = self.shortcut_label();
        if shortcut.is_empty() {
            name
        } else {
            format!("{} ({})", name, shortcut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_simple() {
        assert_eq!(Command::from_name("bold", None), Some(Command::Bold));
        assert_eq!(
            Command::from_name("strikeThrough", None),
            Some(Command::StrikeThrough)
        );
        assert_eq!(
            Command::from_name("JustifyCenter", None),
            Some(Command::Justify(Alignment::Center))
        );
        assert_eq!(Command::from_name("insertSomething", None), None);
    }

    #[test]
    fn test_from_name_format_block() {
        assert_eq!(
            Command::from_name("formatBlock", Some("<H2>")),
            Some(Command::FormatBlock("h2".to_string()))
        );
        assert_eq!(
            Command::from_name("formatBlock", Some("blockquote")),
            Some(Command::FormatBlock("blockquote".to_string()))
        );
        assert_eq!(Command::from_name("formatBlock", Some("table")), None);
        assert_eq!(Command::from_name("formatBlock", None), None);
    }

    #[test]
    fn test_from_name_values() {
        assert_eq!(Command::from_name("fontSize", Some("9")), Some(Command::FontSize(7)));
        assert_eq!(Command::from_name("fontSize", Some("0")), Some(Command::FontSize(1)));
        assert_eq!(Command::from_name("fontSize", Some("big")), None);
        assert_eq!(
            Command::from_name("hiliteColor", Some(" yellow ")),
            Some(Command::BackColor("yellow".to_string()))
        );
        assert_eq!(Command::from_name("foreColor", Some("")), None);
    }

    #[test]
    fn test_name_roundtrips_through_from_name() {
        let commands = [
            Command::Bold,
            Command::FormatBlock("pre".to_string()),
            Command::FontSize(3),
            Command::ForeColor("#ff0000".to_string()),
            Command::Justify(Alignment::Full),
            Command::InsertUnorderedList,
            Command::Unlink,
        ];
        for command in commands {
            let value = command.value();
            assert_eq!(
                Command::from_name(command.name(), value.as_deref()),
                Some(command)
            );
        }
    }

    #[test]
    fn test_tooltips() {
        assert_eq!(Command::Bold.tooltip(), "Bold (Ctrl+B)");
        assert_eq!(
            Command::FormatBlock("h3".to_string()).tooltip(),
            "Heading 3 (Ctrl+3)"
        );
        assert_eq!(Command::Unlink.tooltip(), "Remove Link");
    }

    #[test]
    fn test_alignment_css() {
        assert_eq!(Alignment::Full.css_value(), "justify");
        assert_eq!(Alignment::from_css(" Center "), Some(Alignment::Center));
        assert_eq!(Alignment::from_css("middle"), None);
    }
}
