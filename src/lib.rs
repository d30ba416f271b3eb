//! SOL25 front end.
//!
//! Source text is parsed with a pest grammar ([`syntax`]), checked by an
//! ordered series of validation passes ([`validation`]) and lowered to the
//! canonical tree ([`canonical`]) rendered as XML. [`engine`] ties the
//! stages together; [`cli`] is the thin stdin/stdout wrapper used by the
//! `sol25` binary.

pub use crate::diagnostics::{to_error_source, CompileError, ErrorContext};
pub use crate::engine::{compile, validate, Compilation, Pipeline};

pub mod builtins;
pub mod canonical;
pub mod cli;
pub mod diagnostics;
pub mod engine;
pub mod syntax;
pub mod validation;
