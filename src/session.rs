//! Line-oriented interactive session over a `DrawController`.
//!
//! Plain lines are names typed into the input and submitted. Lines starting
//! with `:` are commands:
//! - `:draw` / `:reset`
//! - `:rm N` removes the N-th name as listed (1-based)
//! - `:list` re-renders names and results
//! - `:copy` / `:csv` copy or export the results
//! - `:quit` ends the session (so does end of input)

use crate::controller::DrawController;
use crate::ports::{ClipboardWriter, FileExporter, Renderer};
use anyhow::Context;
use std::io::{BufRead, Write};

const HELP: &str = ":draw, :reset, :rm N, :list, :copy, :csv, :quit";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One parsed input line.
pub enum SessionCommand {
    /// Text to add as names.
    Input(String),
    /// Run the draw.
    Draw,
    /// Clear everything.
    Reset,
    /// Remove a name by its 1-based position.
    Remove(usize),
    /// Show names and results again.
    List,
    /// Copy results.
    Copy,
    /// Export results as CSV.
    Csv,
    /// End the session.
    Quit,
    /// A `:` line that is not a known command.
    Unknown(String),
}

impl SessionCommand {
    /// Parse one line of session input.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(cmd) = trimmed.strip_prefix(':') else {
            return Self::Input(line.to_string());
        };
        let mut words = cmd.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();
        let extra = words.next();

        match (name.as_str(), arg, extra) {
            ("draw", None, None) => Self::Draw,
            ("reset", None, None) => Self::Reset,
            ("list" | "ls", None, None) => Self::List,
            ("copy", None, None) => Self::Copy,
            ("csv", None, None) => Self::Csv,
            ("quit" | "q" | "exit", None, None) => Self::Quit,
            ("rm" | "remove", Some(n), None) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Remove(n),
                _ => Self::Unknown(trimmed.to_string()),
            },
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Feed `input` line by line into `controller` until `:quit` or end of input.
///
/// Hints for unknown commands and export locations are written to `out`.
///
/// # Errors
/// Returns an error if reading input, rendering, exporting or writing to
/// `out` fails.
pub fn run_session<R, C, F, I, W>(
    controller: &mut DrawController<R, C, F>,
    input: I,
    mut out: W,
) -> anyhow::Result<()>
where
    R: Renderer,
    C: ClipboardWriter,
    F: FileExporter,
    I: BufRead,
    W: Write,
{
    controller.start()?;
    for line in input.lines() {
        let line = line.context("read session input")?;
        match SessionCommand::parse(&line) {
            SessionCommand::Input(text) => {
                controller.submit_input(&text)?;
            }
            SessionCommand::Draw => {
                if controller.draw()? == 0 {
                    writeln!(out, "nothing to draw").context("write hint")?;
                }
            }
            SessionCommand::Reset => controller.reset()?,
            SessionCommand::Remove(position) => {
                if controller.remove_name_at(position - 1)?.is_none() {
                    writeln!(out, "cannot remove #{position}").context("write hint")?;
                }
            }
            SessionCommand::List => controller.refresh()?,
            SessionCommand::Copy => {
                if !controller.copy_results()? {
                    writeln!(out, "nothing to copy").context("write hint")?;
                }
            }
            SessionCommand::Csv => match controller.export_csv()? {
                Some(path) => writeln!(out, "saved {}", path.display()).context("write hint")?,
                None => writeln!(out, "nothing to export").context("write hint")?,
            },
            SessionCommand::Quit => break,
            SessionCommand::Unknown(cmd) => {
                writeln!(out, "unknown command `{cmd}` (try {HELP})").context("write hint")?;
            }
        }
    }
    out.flush().context("flush session output")
}
