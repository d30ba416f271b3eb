//! Unified error type for every stage of the SOL25 front end.
//!
//! Each variant corresponds to one row of the exit-status taxonomy. Passes
//! construct errors with a span only; the driver attaches the source text
//! afterwards with [`CompileError::with_source`] so that `miette` can render
//! labelled snippets when a caller wants more than the one-line summary.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Minimal error context: where the error points and, once known, the source.
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a context with only a span.
    pub fn with_span(span: Span) -> Self {
        Self {
            span: Some(span),
            ..Self::default()
        }
    }
}

/// Where a reserved word was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedPosition {
    AssignmentTarget,
    BlockParameter,
    MethodSelector,
    KeywordSelector,
    UnaryMessage,
}

impl std::fmt::Display for ReservedPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ReservedPosition::AssignmentTarget => "assignment target",
            ReservedPosition::BlockParameter => "block parameter",
            ReservedPosition::MethodSelector => "method selector",
            ReservedPosition::KeywordSelector => "keyword message selector",
            ReservedPosition::UnaryMessage => "unary message",
        };
        f.write_str(text)
    }
}

/// Every way a compilation can fail.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("lexical error: unexpected character {found:?}")]
    Lexical { found: String, ctx: ErrorContext },

    #[error("syntax error: {message}")]
    Syntax { message: String, ctx: ErrorContext },

    #[error("syntax error: reserved word '{name}' used as {position}")]
    ReservedWord {
        name: String,
        position: ReservedPosition,
        ctx: ErrorContext,
    },

    #[error("semantic error: missing class 'Main' with instance method 'run'")]
    MissingEntryPoint { ctx: ErrorContext },

    #[error("semantic error: undefined {what} '{name}'")]
    Undefined {
        what: &'static str,
        name: String,
        ctx: ErrorContext,
    },

    #[error("semantic error: selector '{selector}' expects {expected} parameter(s) but its block declares {actual}")]
    Arity {
        selector: String,
        expected: usize,
        actual: usize,
        ctx: ErrorContext,
    },

    #[error("semantic error: '{name}' is both a block parameter and an assigned local")]
    Collision { name: String, ctx: ErrorContext },

    #[error("semantic error: {what} '{name}' is already defined")]
    Redefinition {
        what: &'static str,
        name: String,
        ctx: ErrorContext,
    },
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        CompileError::Syntax {
            message: message.into(),
            ctx: ErrorContext::with_span(span),
        }
    }

    pub fn undefined(what: &'static str, name: impl Into<String>, span: Span) -> Self {
        CompileError::Undefined {
            what,
            name: name.into(),
            ctx: ErrorContext::with_span(span),
        }
    }

    pub fn redefinition(what: &'static str, name: impl Into<String>, span: Span) -> Self {
        CompileError::Redefinition {
            what,
            name: name.into(),
            ctx: ErrorContext::with_span(span),
        }
    }

    fn ctx(&self) -> &ErrorContext {
        match self {
            CompileError::Lexical { ctx, .. }
            | CompileError::Syntax { ctx, .. }
            | CompileError::ReservedWord { ctx, .. }
            | CompileError::MissingEntryPoint { ctx }
            | CompileError::Undefined { ctx, .. }
            | CompileError::Arity { ctx, .. }
            | CompileError::Collision { ctx, .. }
            | CompileError::Redefinition { ctx, .. } => ctx,
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            CompileError::Lexical { ctx, .. }
            | CompileError::Syntax { ctx, .. }
            | CompileError::ReservedWord { ctx, .. }
            | CompileError::MissingEntryPoint { ctx }
            | CompileError::Undefined { ctx, .. }
            | CompileError::Arity { ctx, .. }
            | CompileError::Collision { ctx, .. }
            | CompileError::Redefinition { ctx, .. } => ctx,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::Lexical { .. } => 21,
            CompileError::Syntax { .. } | CompileError::ReservedWord { .. } => 22,
            CompileError::MissingEntryPoint { .. } => 31,
            CompileError::Undefined { .. } => 32,
            CompileError::Arity { .. } => 33,
            CompileError::Collision { .. } => 34,
            CompileError::Redefinition { .. } => 35,
        }
    }

    /// Short machine-readable name, also used as the diagnostic code suffix.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CompileError::Lexical { .. } => "lexical",
            CompileError::Syntax { .. } => "syntax",
            CompileError::ReservedWord { .. } => "reserved_word",
            CompileError::MissingEntryPoint { .. } => "missing_entry_point",
            CompileError::Undefined { .. } => "undefined",
            CompileError::Arity { .. } => "arity",
            CompileError::Collision { .. } => "collision",
            CompileError::Redefinition { .. } => "redefinition",
        }
    }

    pub fn span(&self) -> Option<Span> {
        self.ctx().span
    }

    /// Attaches the source text so labels can be rendered.
    pub fn with_source(mut self, source: &str) -> Self {
        self.ctx_mut().source = Some(to_error_source(source));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.ctx_mut().help = Some(help.into());
        self
    }

    fn label(&self) -> &'static str {
        match self {
            CompileError::Lexical { .. } => "not a valid token",
            CompileError::Syntax { .. } => "unexpected here",
            CompileError::ReservedWord { .. } => "reserved word",
            CompileError::MissingEntryPoint { .. } => "entry point missing",
            CompileError::Undefined { .. } => "not defined",
            CompileError::Arity { .. } => "arity mismatch",
            CompileError::Collision { .. } => "name collision",
            CompileError::Redefinition { .. } => "defined again here",
        }
    }
}

impl Diagnostic for CompileError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("sol25::{}", self.kind_name())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.ctx().span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.label().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts a source string into an `Arc<NamedSource<String>>` for use in error contexts.
pub fn to_error_source<S: AsRef<str>>(source: S) -> SourceArc {
    Arc::new(NamedSource::new("<stdin>", source.as_ref().to_string()))
}

#[cfg(test)]
mod tests {
    use miette::Report;

    use super::*;

    #[test]
    fn exit_codes_follow_taxonomy() {
        let span = Span::new(0, 1);
        assert_eq!(CompileError::syntax("x", span).exit_code(), 22);
        assert_eq!(CompileError::undefined("variable", "x", span).exit_code(), 32);
        assert_eq!(CompileError::redefinition("class", "A", span).exit_code(), 35);
        let missing = CompileError::MissingEntryPoint {
            ctx: ErrorContext::none(),
        };
        assert_eq!(missing.exit_code(), 31);
        assert!(missing.labels().is_none());
    }

    #[test]
    fn report_renders_label_and_code() {
        let source = "class Main : Object { run [ | x := y. ] }";
        let start = source.find('y').unwrap();
        let err = CompileError::undefined("variable", "y", Span::new(start, start + 1))
            .with_source(source)
            .with_help("declare it as a block parameter first");
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("sol25::undefined"));
        assert!(output.contains("not defined"));
        assert!(output.contains("declare it as a block parameter first"));
    }

    #[test]
    fn display_is_single_line() {
        let err = CompileError::Arity {
            selector: "foo:bar:".into(),
            expected: 2,
            actual: 1,
            ctx: ErrorContext::none(),
        };
        let text = err.to_string();
        assert!(!text.contains('\n'));
        assert!(text.contains("foo:bar:"));
    }
}
