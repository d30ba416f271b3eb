//! Handles all user-facing output for the CLI.
//!
//! The canonical tree goes to stdout; diagnostics and usage errors go to
//! stderr, one line each.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::diagnostics::Sol25Diagnostic;
use crate::diagnostics::CompileError;

fn stderr_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Writes the rendered document to stdout as is.
pub fn print_tree(xml: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(xml.as_bytes())?;
    lock.flush()
}

/// Prints the single diagnostic line for a failed compilation.
pub fn print_error(error: &CompileError, source: Option<&str>) {
    let mut stderr = StandardStream::stderr(stderr_choice());
    let diagnostic = Sol25Diagnostic::new(error, source);
    if diagnostic.write_colored(&mut stderr).is_err() {
        eprintln!("{diagnostic}");
    }
}

/// Prints a usage or I/O problem that happened outside the compiler.
pub fn print_failure(message: &str) {
    let mut stderr = StandardStream::stderr(stderr_choice());
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {message}");
}
