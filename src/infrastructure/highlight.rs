//! Console highlighting strategies.
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically via `colored`.

use std::io::IsTerminal;

use colored::Colorize;
use tracing::debug;

use crate::config::ColorChoice;

/// Styling applied to console prompt output.
pub trait Highlighter: Send {
    fn title(&self, text: &str) -> String;
    fn notice(&self, text: &str) -> String;
    fn prompt(&self, text: &str) -> String;
    fn keep(&self, text: &str) -> String;
    fn remove(&self, text: &str) -> String;
}

/// ANSI colors.
#[derive(Debug, Default)]
pub struct ColorHighlighter;

impl Highlighter for ColorHighlighter {
    fn title(&self, text: &str) -> String {
        text.bold().to_string()
    }

    fn notice(&self, text: &str) -> String {
        text.yellow().bold().to_string()
    }

    fn prompt(&self, text: &str) -> String {
        text.cyan().to_string()
    }

    fn keep(&self, text: &str) -> String {
        text.green().to_string()
    }

    fn remove(&self, text: &str) -> String {
        text.red().to_string()
    }
}

/// Text unchanged.
#[derive(Debug, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn title(&self, text: &str) -> String {
        text.to_string()
    }

    fn notice(&self, text: &str) -> String {
        text.to_string()
    }

    fn prompt(&self, text: &str) -> String {
        text.to_string()
    }

    fn keep(&self, text: &str) -> String {
        text.to_string()
    }

    fn remove(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Pick the highlighter for this run and align `colored`'s global switch with it.
///
/// `Auto` colors only when stdout is a terminal.
pub fn select_highlighter(choice: ColorChoice) -> Box<dyn Highlighter> {
    let colored = match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal(),
    };
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
    debug!("highlighter: {}", if colored { "color" } else { "plain" });

    if colored {
        Box::new(ColorHighlighter)
    } else {
        Box::new(PlainHighlighter)
    }
}
