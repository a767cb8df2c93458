//! Terminal output: plain lines plus green/red notices.

use std::io::{self, Write};

use colored::Colorize;

use jobsheet::notice::Notice;

/// Where command output goes.
pub struct Output<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Output<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Writes `text` followed by a newline.
    pub fn line(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", text.as_ref())
    }

    /// Writes a block that already carries its own line breaks.
    pub fn block(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// A bold heading line.
    pub fn heading(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.out, "{}", text.bold())
        } else {
            writeln!(self.out, "{text}")
        }
    }

    /// A success or error banner.
    pub fn notice(&mut self, notice: &Notice) -> io::Result<()> {
        let text = notice.to_string();
        match (self.color, notice.is_error()) {
            (false, _) => writeln!(self.out, "{text}"),
            (true, false) => writeln!(self.out, "{}", text.green()),
            (true, true) => writeln!(self.out, "{}", text.red()),
        }
    }

    /// A `label: value` pair with the label padded to `width`.
    pub fn field(&mut self, label: &str, value: &str, width: usize) -> io::Result<()> {
        if self.color {
            let padded = format!("{label:<width$}");
            writeln!(self.out, "{} {value}", padded.dimmed())
        } else {
            writeln!(self.out, "{label:<width$} {value}")
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Formats an error for stderr, red when `color` is set.
#[must_use]
pub fn error_line(message: &str, color: bool) -> String {
    let text = Notice::Error(message.to_string()).to_string();
    if color {
        text.red().to_string()
    } else {
        text
    }
}
