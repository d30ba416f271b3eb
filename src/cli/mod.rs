//! The `sol25` command-line interface.
//!
//! Reads a whole program from stdin, runs the compilation pipeline and
//! maps the outcome to a process exit code.

use std::io::{self, Read};

use std::ffi::OsString;

use clap::{CommandFactory, Parser};
use tracing::debug;

use crate::cli::args::{self as cli_args, Sol25Args};
use crate::diagnostics::{CompileError, ErrorContext};
use crate::engine;
use crate::syntax::Span;

pub mod args;
pub mod diagnostics;
pub mod output;

pub const EXIT_OK: i32 = 0;
pub const EXIT_USAGE: i32 = 10;
pub const EXIT_INPUT: i32 = 11;
pub const EXIT_OUTPUT: i32 = 12;

/// Runs the CLI with the process arguments and returns the exit code.
pub fn run() -> i32 {
    run_with_args(std::env::args_os())
}

pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if !cli_args::is_accepted(args.get(1..).unwrap_or_default()) {
        output::print_failure("expected no arguments or a single -h/--help");
        return EXIT_USAGE;
    }
    let parsed = match Sol25Args::try_parse_from(&args) {
        Ok(parsed) => parsed,
        Err(err) => return handle_usage(err),
    };
    if parsed.help {
        let _ = Sol25Args::command().print_help();
        return EXIT_OK;
    }

    let mut bytes = Vec::new();
    if let Err(err) = io::stdin().lock().read_to_end(&mut bytes) {
        output::print_failure(&format!("cannot read standard input: {err}"));
        return EXIT_INPUT;
    }
    debug!(bytes = bytes.len(), "read source");

    let source = match decode(bytes) {
        Ok(source) => source,
        Err((err, lossy)) => {
            output::print_error(&err, Some(&lossy));
            return err.exit_code();
        }
    };

    match engine::compile(&source) {
        Ok(xml) => match output::print_tree(&xml) {
            Ok(()) => EXIT_OK,
            Err(err) => {
                output::print_failure(&format!("cannot write output: {err}"));
                EXIT_OUTPUT
            }
        },
        Err(err) => {
            output::print_error(&err, Some(&source));
            err.exit_code()
        }
    }
}

fn handle_usage(err: clap::Error) -> i32 {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    output::print_failure(first.trim_start_matches("error: "));
    EXIT_USAGE
}

/// Source must be UTF-8. The first invalid byte is reported as a lexical
/// error, together with a lossy copy of the input for locating it.
fn decode(bytes: Vec<u8>) -> Result<String, (CompileError, String)> {
    String::from_utf8(bytes).map_err(|err| {
        let position = err.utf8_error().valid_up_to();
        let bytes = err.into_bytes();
        let found = bytes
            .get(position)
            .map(|b| format!("\\x{b:02x}"))
            .unwrap_or_default();
        let lossy = String::from_utf8_lossy(&bytes[..position]).into_owned();
        let error = CompileError::Lexical {
            found,
            ctx: ErrorContext::with_span(Span::new(position, position + 1)),
        };
        (error, lossy)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_utf8_is_lexical() {
        let (err, lossy) = decode(b"class \xff".to_vec()).unwrap_err();
        assert_eq!(err.exit_code(), 21);
        assert_eq!(err.span(), Some(Span::new(6, 7)));
        assert_eq!(lossy, "class ");
    }

    #[test]
    fn unknown_argument_is_usage_error() {
        assert_eq!(run_with_args(["sol25", "--bogus"]), EXIT_USAGE);
        assert_eq!(run_with_args(["sol25", "file.sol"]), EXIT_USAGE);
    }

    #[test]
    fn help_must_stand_alone() {
        assert_eq!(run_with_args(["sol25", "--help"]), EXIT_OK);
        assert_eq!(run_with_args(["sol25", "-h"]), EXIT_OK);
        assert_eq!(run_with_args(["sol25", "--help", "extra"]), EXIT_USAGE);
        assert_eq!(run_with_args(["sol25", "-hh"]), EXIT_USAGE);
        assert_eq!(run_with_args(["sol25", "--"]), EXIT_USAGE);
    }
}
