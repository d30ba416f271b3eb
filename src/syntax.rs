//! Syntax module for SOL25
//!
//! Concrete syntax tree types produced by the parser. Node kinds mirror the
//! grammar productions one-to-one; every node carries the byte span it was
//! parsed from so later passes can point diagnostics at the source.

pub mod parser;

pub use parser::{first_comment, parse};

/// Represents a span in the source code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Converts the start of the span into a 1-based (line, column) pair.
    /// Returns `None` when the span lies outside `source`.
    pub fn line_col(&self, source: &str) -> Option<(usize, usize)> {
        if self.start > source.len() || !source.is_char_boundary(self.start) {
            return None;
        }
        let before = &source[..self.start];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = source[line_start..self.start].chars().count() + 1;
        Some((line, col))
    }
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

/// An identifier token together with where it appeared.
pub type Ident = Spanned<String>;

// ============================================================================
// PROGRAM STRUCTURE
// ============================================================================

/// Root of the concrete syntax tree: the classes in textual order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub classes: Vec<ClassDef>,
    pub span: Span,
}

/// `class Name : Parent { methods }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: Ident,
    pub parent: Ident,
    pub methods: Vec<MethodDef>,
    pub span: Span,
}

/// A selector paired with its body block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub selector: Selector,
    pub body: Block,
    pub span: Span,
}

/// A method selector as written in a method definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `run`
    Unary(Ident),
    /// `at:put:`, stored as the parts without their colons.
    Keyword(Vec<Ident>),
}

impl Selector {
    /// Number of keyword parts; zero for a unary selector.
    pub fn arity(&self) -> usize {
        match self {
            Selector::Unary(_) => 0,
            Selector::Keyword(parts) => parts.len(),
        }
    }

    /// Symbol-table key: the bare name, or the parts joined by single colons.
    pub fn normalized(&self) -> String {
        match self {
            Selector::Unary(name) => name.value.clone(),
            Selector::Keyword(parts) => join_parts(parts, ":"),
        }
    }

    /// Message form used in the canonical tree: every keyword part keeps its colon.
    pub fn message_name(&self) -> String {
        match self {
            Selector::Unary(name) => name.value.clone(),
            Selector::Keyword(parts) => parts.iter().map(|p| format!("{}:", p.value)).collect(),
        }
    }

    /// The identifiers that make up the selector, in order.
    pub fn parts(&self) -> &[Ident] {
        match self {
            Selector::Unary(name) => std::slice::from_ref(name),
            Selector::Keyword(parts) => parts,
        }
    }

    pub fn span(&self) -> Span {
        let parts = self.parts();
        match (parts.first(), parts.last()) {
            (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
            _ => Span::default(),
        }
    }
}

fn join_parts(parts: &[Ident], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.value.as_str())
        .collect::<Vec<_>>()
        .join(sep)
}

// ============================================================================
// BLOCKS AND STATEMENTS
// ============================================================================

/// `[ :a :b | x := expr. ... ]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub params: Vec<Ident>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Block {
    /// Names that are targets of an assignment statement in this block.
    pub fn assigned_names(&self) -> impl Iterator<Item = &Ident> {
        self.statements.iter().map(|s| &s.target)
    }
}

/// `target := value.`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub target: Ident,
    pub value: Expr,
    pub span: Span,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// A base operand optionally followed by a unary or keyword message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub base: Spanned<ExprBase>,
    pub tail: ExprTail,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprBase {
    /// Integer literal text, sign included.
    Int(String),
    /// String literal text between the quotes, escapes untouched.
    Str(String),
    /// Lowercase identifier.
    Id(String),
    /// Capitalised identifier.
    ClassId(String),
    Block(Block),
    /// `( expr )`
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprTail {
    Empty,
    /// `receiver name`
    Unary(Ident),
    /// `receiver key: arg other: arg`
    Keyword(Vec<KeywordArg>),
}

impl ExprTail {
    pub fn is_empty(&self) -> bool {
        matches!(self, ExprTail::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordArg {
    pub keyword: Ident,
    pub arg: Spanned<ExprBase>,
}
