//! Command-line surface of the `sol25` binary.
//!
//! The compiler takes no arguments: source is read from standard input and
//! the canonical tree is written to standard output. Only `-h`/`--help` is
//! accepted; anything else is a usage error.

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "sol25",
    about = "Parse and validate a SOL25 program and print its canonical XML tree.",
    long_about = "Reads SOL25 source from standard input, validates it, and writes \
                  the canonical XML representation to standard output.\n\n\
                  Exit codes: 10 usage, 11 input, 21 lexical, 22 syntax, \
                  31 missing Main.run, 32 undefined, 33 arity, 34 collision, \
                  35 redefinition.",
    disable_version_flag = true,
    disable_help_flag = true
)]
pub struct Sol25Args {
    /// Print help and exit
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,
}

/// The only accepted invocations are no argument or a single help flag.
pub fn is_accepted(args: &[std::ffi::OsString]) -> bool {
    match args {
        [] => true,
        [only] => only == "-h" || only == "--help",
        _ => false,
    }
}
