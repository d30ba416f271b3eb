//! One-line presentation of compile errors.
//!
//! The compiler reports exactly one line per failure. [`Sol25Diagnostic`]
//! formats that line, adding the line and column of the error span when the
//! source is known.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::diagnostics::CompileError;

pub struct Sol25Diagnostic<'a> {
    error: &'a CompileError,
    source: Option<&'a str>,
}

impl<'a> Sol25Diagnostic<'a> {
    pub fn new(error: &'a CompileError, source: Option<&'a str>) -> Self {
        Self { error, source }
    }

    fn location(&self) -> Option<(usize, usize)> {
        self.error.span()?.line_col(self.source?)
    }

    /// Writes the diagnostic with a coloured `error` prefix and a newline.
    pub fn write_colored<W: WriteColor>(&self, out: &mut W) -> io::Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "error")?;
        out.reset()?;
        write!(out, ": {}", self.error)?;
        if let Some((line, col)) = self.location() {
            out.set_color(ColorSpec::new().set_dimmed(true))?;
            write!(out, " (line {line}, column {col})")?;
            out.reset()?;
        }
        writeln!(out)
    }
}

impl Display for Sol25Diagnostic<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "error: {}", self.error)?;
        if let Some((line, col)) = self.location() {
            write!(f, " (line {line}, column {col})")?;
        }
        Ok(())
    }
}
