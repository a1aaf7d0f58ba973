//! Terminal rendering for the chat session.
//!
//! Answers stream in place: each update carries the whole sanitized answer so
//! far, and only the part not yet on screen is written. When sanitizing a
//! longer text rewrites something already printed, the answer is printed
//! again in full on a fresh line.

use std::io::{self, Write};

use taxaumate_chat::TurnView;
use taxaumate_core::{SourceRef, WELCOME_MESSAGE};

pub const BANNER: &str = "TaxAUmate \u{2014} Instant tax related answers with RAG precision";

pub const FOOTER: &str = "\
TaxAUmate is an AI assistant for informational purposes and does not constitute professional tax advice.
\u{a9} 2025 TaxAUmate";

pub const INPUT_HINT: &str = "Ask a question about Australian taxation...";

const RULE_WIDTH: usize = 72;

// ── Session chrome ──

pub fn print_welcome(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{BANNER}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;
    writeln!(out, "{WELCOME_MESSAGE}")?;
    writeln!(out)?;
    writeln!(out, "({INPUT_HINT} Ctrl-D to quit.)")?;
    Ok(())
}

pub fn print_prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "\n> ")?;
    out.flush()
}

pub fn print_footer(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "{FOOTER}")?;
    Ok(())
}

// ── Per-turn view ──

/// [`TurnView`] writing to a terminal (or any writer).
///
/// Write errors are dropped: a closed stdout ends the session at the next
/// prompt instead.
pub struct TerminalView<W: Write> {
    out: W,
    rendered: String,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rendered: String::new(),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    /// Bring the on-screen answer up to `text`.
    fn update(&mut self, text: &str) {
        if let Some(suffix) = text.strip_prefix(self.rendered.as_str()) {
            self.emit(suffix);
        } else {
            self.emit("\n");
            self.emit(text);
        }
        self.rendered.clear();
        self.rendered.push_str(text);
    }

    fn end_answer(&mut self) {
        if !self.rendered.is_empty() {
            self.emit("\n");
        }
        self.rendered.clear();
    }
}

impl<W: Write> TurnView for TerminalView<W> {
    fn status(&mut self, message: &str) {
        self.emit(&format!("\n{message}\n"));
    }

    fn sources(&mut self, sources: &[SourceRef]) {
        let mut block = String::from("\nRetrieved Sources:\n");
        for source in sources {
            block.push_str(&format!("- [{}]({})\n", source.title, source.url));
        }
        self.emit(&block);
    }

    fn warning(&mut self, message: &str) {
        self.emit(&format!("Warning: {message}\n"));
    }

    fn partial(&mut self, text: &str) {
        if self.rendered.is_empty() {
            self.emit("\n");
        }
        self.update(text);
    }

    fn finish(&mut self, text: &str) {
        if self.rendered.is_empty() {
            self.emit("\n");
        }
        self.update(text);
        self.end_answer();
    }

    fn error(&mut self, message: &str) {
        self.end_answer();
        self.emit(&format!("\nError: {message}\n"));
    }
}
