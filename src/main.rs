//! Lectern - command-line driver
//!
//! Loads a markup file into an editor, applies the requested actions
//! and prints the resulting markup, preview, or standalone document.

mod cli;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use cli::{split_command, split_pair, Cli};
use lectern::config::load_config;
use lectern::preview::{standalone_document, PreviewOptions};
use lectern::{DialogResult, EditorProps, Error, InsertionDialog, Mode, Result, RichTextEditor};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let settings = load_config();
    let markup = fs::read_to_string(&cli.file)?;
    info!("Loaded {} ({} bytes)", cli.file.display(), markup.len());

    let mut editor = RichTextEditor::new(EditorProps::with_value(markup), settings);

    if let Some(text) = &cli.select {
        let found = editor
            .surface_mut()
            .is_some_and(|surface| surface.select_text(text));
        if !found {
            return Err(Error::Application(format!("Text '{}' not found", text)));
        }
        editor.on_pointer_up();
        editor.tick();
    }

    for arg in &cli.commands {
        let (name, value) = split_command(arg);
        if !editor.execute_named(name, value) {
            warn!("Command '{}' was not applied", arg);
        }
    }

    for tag in &cli.toggles {
        match editor.toggle_block(tag) {
            Some(outcome) => info!("Toggled {} {:?}", tag, outcome),
            None => warn!("Block format '{}' was not toggled", tag),
        }
    }

    if let Some(arg) = &cli.link {
        editor.open_link_dialog();
        fill_and_submit(&mut editor, split_pair(arg))?;
    }

    if let Some(arg) = &cli.image {
        editor.open_image_dialog();
        fill_and_submit(&mut editor, split_pair(arg))?;
    }

    if cli.preview {
        editor.set_mode(Mode::Previewing);
        return Ok(editor.preview());
    }
    if let Some(title) = &cli.export {
        editor.set_mode(Mode::Previewing);
        let options = PreviewOptions::from(editor.settings());
        return Ok(standalone_document(editor.value(), Some(title), options));
    }
    editor.on_input();
    Ok(editor.value().to_string())
}

/// Fill the open dialog and submit it. An empty label keeps the dialog's default.
fn fill_and_submit(editor: &mut RichTextEditor, (url, label): (&str, &str)) -> Result<()> {
    let dialog = editor
        .dialog_mut()
        .ok_or_else(|| Error::Application("Insertion dialog could not be opened".to_string()))?;
    dialog.set_url(url);
    if !label.is_empty() {
        dialog.set_label(label);
    }

    match editor.submit_dialog() {
        Some(DialogResult::Insert(_)) => Ok(()),
        _ => Err(Error::Application(dialog_errors(editor.dialog()))),
    }
}

fn dialog_errors(dialog: Option<&InsertionDialog>) -> String {
    let Some(dialog) = dialog else {
        return "Insertion was not completed".to_string();
    };
    let messages: Vec<&str> = [dialog.url_error(), dialog.label_error()]
        .into_iter()
        .flatten()
        .collect();
    format!("{}: {}", dialog.title(), messages.join("; "))
}
