// src/display/terminal.rs
//! Terminal progress output

use super::ProgressSink;
use crate::{error::Result, merger::BatchSummary};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Stdout, Write};

/// Prints batch and per-file progress lines to a terminal
pub struct TerminalProgress<W: Write = Stdout> {
    out: W,
}

impl TerminalProgress<Stdout> {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalProgress<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressSink for TerminalProgress<W> {
    fn batch_started(&mut self, label: &str, total: usize) -> Result<()> {
        execute!(
            self.out,
            Print("\n"),
            SetForegroundColor(Color::Green),
            Print(format!("Processing {} files from {}...\n", total, label)),
            ResetColor
        )?;
        Ok(())
    }

    fn file_started(&mut self, index: usize, total: usize, name: &str) -> Result<()> {
        execute!(
            self.out,
            Print(format!("Processing file {} of {}: {}\n", index, total, name))
        )?;
        Ok(())
    }

    fn batch_finished(&mut self, summary: &BatchSummary) -> Result<()> {
        execute!(
            self.out,
            SetForegroundColor(Color::Cyan),
            Print(format!(
                "Wrote {} of {} lines to {}\n",
                summary.lines_written,
                summary.lines_read,
                summary.output.display()
            )),
            ResetColor
        )?;

        if let Some(info) = &summary.info_copied {
            execute!(
                self.out,
                Print(format!("Copied {}\n", info.display()))
            )?;
        }

        self.out.flush()?;
        Ok(())
    }
}

impl Default for TerminalProgress<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}
