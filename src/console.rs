//! User-facing output.
//!
//! Confirmations go to stdout, failures and warnings to stderr. A capturing
//! console records both streams so command output can be asserted in tests.

use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::io::{IsTerminal, Write};

const OK: &str = "✓";
const FAIL: &str = "✗";
const WARN: &str = "⚠";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug)]
enum Sink {
    Stdio,
    Capture(Mutex<Captured>),
}

#[derive(Debug)]
pub struct Console {
    sink: Sink,
    color: bool,
}

impl Console {
    /// Console on the process streams. Color is used when stdout is a
    /// terminal and `NO_COLOR` is unset.
    pub fn stdio() -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            sink: Sink::Stdio,
            color,
        }
    }

    /// Uncolored console that records everything written to it.
    pub fn capture() -> Self {
        Self {
            sink: Sink::Capture(Mutex::new(Captured::default())),
            color: false,
        }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Write `text` to stdout as-is.
    pub fn write(&self, text: &str) {
        match &self.sink {
            Sink::Stdio => {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            Sink::Capture(captured) => captured.lock().stdout.push_str(text),
        }
    }

    fn write_err(&self, text: &str) {
        match &self.sink {
            Sink::Stdio => {
                let mut err = std::io::stderr().lock();
                let _ = err.write_all(text.as_bytes());
            }
            Sink::Capture(captured) => captured.lock().stderr.push_str(text),
        }
    }

    /// One line to stdout.
    pub fn out(&self, line: impl AsRef<str>) {
        self.write(&format!("{}\n", line.as_ref()));
    }

    /// One line to stderr.
    pub fn err(&self, line: impl AsRef<str>) {
        self.write_err(&format!("{}\n", line.as_ref()));
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.out(format!("{} {}", self.ok_mark(), message.as_ref()));
    }

    pub fn failure(&self, message: impl AsRef<str>) {
        self.err(format!("{} {}", self.fail_mark(), message.as_ref()));
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.err(format!("{} {}", self.warn_mark(), message.as_ref()));
    }

    pub fn ok_mark(&self) -> String {
        self.paint(OK, |s| s.green().to_string())
    }

    pub fn fail_mark(&self) -> String {
        self.paint(FAIL, |s| s.red().to_string())
    }

    pub fn warn_mark(&self) -> String {
        self.paint(WARN, |s| s.yellow().to_string())
    }

    fn paint(&self, glyph: &str, style: impl Fn(&str) -> String) -> String {
        if self.color {
            style(glyph)
        } else {
            glyph.to_string()
        }
    }

    /// Everything written so far. Empty for a stdio console.
    pub fn captured(&self) -> Captured {
        match &self.sink {
            Sink::Stdio => Captured::default(),
            Sink::Capture(captured) => captured.lock().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_routes_by_stream() {
        let console = Console::capture();
        console.success("Installed testkit v1.0.0");
        console.failure("Kit 'x' not found");
        console.warning("Could not fetch remote registry");
        console.write("raw");

        let captured = console.captured();
        assert_eq!(captured.stdout, "✓ Installed testkit v1.0.0\nraw");
        assert_eq!(
            captured.stderr,
            "✗ Kit 'x' not found\n⚠ Could not fetch remote registry\n"
        );
    }
}
