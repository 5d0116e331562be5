//! Terminal output for markdown and JSON results
//!
//! Markdown is rendered with termimad when color is enabled and printed
//! verbatim otherwise. JSON output bypasses markdown entirely.

use anyhow::{Context, Result};
use serde::Serialize;
use termimad::{crossterm::style::Color, MadSkin};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Rich,
    Plain,
    Json,
}

impl OutputMode {
    pub fn from_flags(json: bool, no_color: bool) -> Self {
        if json {
            OutputMode::Json
        } else if no_color {
            OutputMode::Plain
        } else {
            OutputMode::Rich
        }
    }
}

pub struct TerminalRenderer {
    mode: OutputMode,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(mode: OutputMode) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { mode, skin }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Prints `markdown`, or `value` as pretty JSON in JSON mode.
    pub fn emit<T: Serialize + ?Sized>(&self, markdown: &str, value: &T) -> Result<()> {
        if self.is_json() {
            println!(
                "{}",
                serde_json::to_string_pretty(value).context("Failed to serialize output")?
            );
            return Ok(());
        }
        self.render(markdown);
        Ok(())
    }

    /// Render markdown text to terminal
    pub fn render(&self, markdown: &str) {
        match self.mode {
            OutputMode::Rich => {
                for line in markdown.lines() {
                    // Headers keep their hash marks so IDs stay easy to spot
                    if line.starts_with('#') {
                        println!("\x1b[34m{line}\x1b[0m");
                    } else {
                        self.skin.print_inline(line);
                        println!();
                    }
                }
            }
            OutputMode::Plain | OutputMode::Json => print!("{markdown}"),
        }
    }
}
