use clap::Parser;
use std::path::PathBuf;

/// Apply editing actions to a markup document and print the result.
///
/// Actions run in a fixed order: select, exec, toggle, link, image.
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(about = "Rich-text markup editing from the command line")]
#[command(version)]
pub struct Cli {
    /// Markup file to load
    pub file: PathBuf,

    /// Select the first occurrence of TEXT before running commands
    #[arg(long, value_name = "TEXT")]
    pub select: Option<String>,

    /// Run a formatting command (e.g. bold, formatBlock=h2, foreColor=red)
    #[arg(long = "exec", value_name = "NAME[=VALUE]")]
    pub commands: Vec<String>,

    /// Toggle a block format on the selected block (e.g. blockquote, pre)
    #[arg(long = "toggle", value_name = "TAG")]
    pub toggles: Vec<String>,

    /// Insert a link; TEXT defaults to the selected text
    #[arg(long, value_name = "URL=TEXT")]
    pub link: Option<String>,

    /// Insert an image
    #[arg(long, value_name = "URL=ALT")]
    pub image: Option<String>,

    /// Print the sanitized preview instead of the markup
    #[arg(long, conflicts_with = "export")]
    pub preview: bool,

    /// Print a standalone HTML document with the given title
    #[arg(long, value_name = "TITLE")]
    pub export: Option<String>,
}

/// Split `NAME=VALUE`; the value is optional.
pub fn split_command(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value)),
        None => (arg.trim(), None),
    }
}

/// Split `URL=LABEL` at the last `=`, so query strings survive.
pub fn split_pair(arg: &str) -> (&str, &str) {
    match arg.rsplit_once('=') {
        Some((url, label)) => (url.trim(), label.trim()),
        None => (arg.trim(), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("bold"), ("bold", None));
        assert_eq!(split_command("formatBlock=h2"), ("formatBlock", Some("h2")));
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("example.com=Site"), ("example.com", "Site"));
        assert_eq!(split_pair("a.com/?q=1=Query"), ("a.com/?q=1", "Query"));
        assert_eq!(split_pair("x.png"), ("x.png", ""));
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from([
            "lectern", "doc.html", "--select", "word", "--exec", "bold", "--exec", "fontSize=5",
            "--toggle", "blockquote", "--preview",
        ]);
        assert_eq!(cli.file, PathBuf::from("doc.html"));
        assert_eq!(cli.commands, vec!["bold", "fontSize=5"]);
        assert_eq!(cli.toggles, vec!["blockquote"]);
        assert!(cli.preview);
        assert!(Cli::try_parse_from(["lectern", "d", "--preview", "--export", "T"]).is_err());
    }
}
