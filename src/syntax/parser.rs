//! SOL25 Parser
//!
//! Converts SOL25 source text into the concrete syntax tree. Parsing is purely
//! syntactic: reserved words, scoping and arity are left to `validation`.
//!
//! The source is scanned twice. The first scan only checks that the text is a
//! sequence of valid lexemes, which lets us tell a lexical error (a character
//! no token can start with) apart from a grammar error (valid tokens in the
//! wrong order).

use once_cell::sync::Lazy;
use pest::{
    error::{Error, ErrorVariant, InputLocation},
    iterators::{Pair, Pairs},
    Parser,
};
use pest_derive::Parser;
use regex::Regex;
use tracing::debug;

use crate::diagnostics::{CompileError, ErrorContext};
use crate::syntax::{
    Block, ClassDef, Expr, ExprBase, ExprTail, Ident, KeywordArg, MethodDef, Program, Selector,
    Span, Spanned, Statement,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct Sol25Parser;

/// Deepest allowed nesting of parentheses and blocks.
pub const MAX_NESTING: usize = 256;

static FIRST_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("comment pattern is a valid regex"));

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse SOL25 source text into a concrete syntax tree.
pub fn parse(source: &str) -> Result<Program, CompileError> {
    check_lexemes(source)?;
    check_nesting(source)?;

    let mut pairs = Sol25Parser::parse(Rule::program, source)
        .map_err(|e| convert_grammar_error(e, source))?;
    let program = pairs
        .next()
        .ok_or_else(|| CompileError::syntax("empty parse result", Span::default()))?;

    let program = build_program(program)?;
    debug!(classes = program.classes.len(), "parsed program");
    Ok(program)
}

/// Inner text of the first double-quoted comment anywhere in `source`.
///
/// This is a plain textual scan, so a double quote inside a string literal
/// counts too. Empty comments yield `None`.
pub fn first_comment(source: &str) -> Option<&str> {
    FIRST_COMMENT
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|text| !text.is_empty())
}

// ============================================================================
// LEXICAL SCAN
// ============================================================================

fn check_lexemes(source: &str) -> Result<(), CompileError> {
    match Sol25Parser::parse(Rule::tokens, source) {
        Ok(_) => Ok(()),
        Err(error) => {
            let pos = error_position(&error);
            let found = source[pos..]
                .chars()
                .next()
                .map(String::from)
                .unwrap_or_else(|| "end of input".to_string());
            let end = pos + found.len().max(1);
            Err(CompileError::Lexical {
                found,
                ctx: ErrorContext::with_span(Span::new(pos, end.min(source.len()).max(pos))),
            })
        }
    }
}

/// Rejects sources whose `(` / `[` nesting would exhaust the stack of the
/// recursive grammar and tree builders. Runs after the lexical scan, so
/// strings and comments are known to be closed.
fn check_nesting(source: &str) -> Result<(), CompileError> {
    let mut depth = 0usize;
    let mut chars = source.char_indices();
    while let Some((pos, c)) = chars.next() {
        match c {
            '\'' => {
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '\'' => break,
                        _ => {}
                    }
                }
            }
            '"' => {
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                }
            }
            '(' | '[' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(CompileError::syntax(
                        "expressions nested too deeply",
                        Span::new(pos, pos + 1),
                    ));
                }
            }
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// CST BUILDERS
// ============================================================================

fn build_program(pair: Pair<Rule>) -> Result<Program, CompileError> {
    let span = get_span(&pair);
    let classes = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::class_def)
        .map(build_class)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Program { classes, span })
}

fn build_class(pair: Pair<Rule>) -> Result<ClassDef, CompileError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    expect_next(&mut inner, "'class'", span)?;
    let name = build_ident(expect_next(&mut inner, "class name", span)?);
    let parent = build_ident(expect_next(&mut inner, "parent class name", span)?);
    let methods = inner.map(build_method).collect::<Result<Vec<_>, _>>()?;
    Ok(ClassDef {
        name,
        parent,
        methods,
        span,
    })
}

fn build_method(pair: Pair<Rule>) -> Result<MethodDef, CompileError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let selector = build_selector(expect_next(&mut inner, "method selector", span)?)?;
    let body = build_block(expect_next(&mut inner, "method body", span)?)?;
    Ok(MethodDef {
        selector,
        body,
        span,
    })
}

fn build_selector(pair: Pair<Rule>) -> Result<Selector, CompileError> {
    let span = get_span(&pair);
    let form = expect_next(&mut pair.into_inner(), "selector", span)?;
    match form.as_rule() {
        Rule::keyword_selector => Ok(Selector::Keyword(form.into_inner().map(build_ident).collect())),
        Rule::unary_selector => {
            let name = expect_next(&mut form.into_inner(), "selector name", span)?;
            Ok(Selector::Unary(build_ident(name)))
        }
        rule => Err(unsupported(rule, span)),
    }
}

fn build_block(pair: Pair<Rule>) -> Result<Block, CompileError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let params = expect_next(&mut inner, "block parameters", span)?
        .into_inner()
        .map(build_ident)
        .collect();
    let statements = expect_next(&mut inner, "block body", span)?
        .into_inner()
        .map(build_statement)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Block {
        params,
        statements,
        span,
    })
}

fn build_statement(pair: Pair<Rule>) -> Result<Statement, CompileError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let target = build_ident(expect_next(&mut inner, "assignment target", span)?);
    let value = build_expr(expect_next(&mut inner, "assigned expression", span)?)?;
    Ok(Statement {
        target,
        value,
        span,
    })
}

fn build_expr(pair: Pair<Rule>) -> Result<Expr, CompileError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let base = build_expr_base(expect_next(&mut inner, "expression", span)?)?;

    let tail = match inner.next() {
        None => ExprTail::Empty,
        Some(tail) => match tail.as_rule() {
            Rule::unary_tail => {
                let tail_span = get_span(&tail);
                let name = expect_next(&mut tail.into_inner(), "message name", tail_span)?;
                ExprTail::Unary(build_ident(name))
            }
            Rule::keyword_tail => ExprTail::Keyword(
                tail.into_inner()
                    .map(build_keyword_arg)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            rule => return Err(unsupported(rule, get_span(&tail))),
        },
    };

    Ok(Expr { base, tail, span })
}

fn build_keyword_arg(pair: Pair<Rule>) -> Result<KeywordArg, CompileError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let keyword = build_ident(expect_next(&mut inner, "keyword", span)?);
    let arg = build_expr_base(expect_next(&mut inner, "keyword argument", span)?)?;
    Ok(KeywordArg { keyword, arg })
}

fn build_expr_base(pair: Pair<Rule>) -> Result<Spanned<ExprBase>, CompileError> {
    let span = get_span(&pair);
    let form = expect_next(&mut pair.into_inner(), "operand", span)?;
    let value = match form.as_rule() {
        Rule::integer => ExprBase::Int(form.as_str().to_string()),
        Rule::string => ExprBase::Str(strip_quotes(form.as_str()).to_string()),
        Rule::id => ExprBase::Id(form.as_str().to_string()),
        Rule::cid => ExprBase::ClassId(form.as_str().to_string()),
        Rule::block => ExprBase::Block(build_block(form)?),
        Rule::paren => {
            let paren_span = get_span(&form);
            let inner = expect_next(&mut form.into_inner(), "parenthesised expression", paren_span)?;
            ExprBase::Paren(Box::new(build_expr(inner)?))
        }
        rule => return Err(unsupported(rule, span)),
    };
    Ok(Spanned::new(value, span))
}

fn build_ident(pair: Pair<Rule>) -> Ident {
    Spanned::new(pair.as_str().to_string(), get_span(&pair))
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn expect_next<'i>(
    inner: &mut Pairs<'i, Rule>,
    element: &str,
    span: Span,
) -> Result<Pair<'i, Rule>, CompileError> {
    inner
        .next()
        .ok_or_else(|| CompileError::syntax(format!("missing {element}"), span))
}

fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text)
}

fn unsupported(rule: Rule, span: Span) -> CompileError {
    CompileError::syntax(format!("unsupported construct {rule:?}"), span)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn error_position(error: &Error<Rule>) -> usize {
    match error.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    }
}

/// Text of the token starting at `pos`, for error messages.
fn token_at(source: &str, pos: usize) -> String {
    let rest = &source[pos.min(source.len())..];
    let Some(first) = rest.chars().next() else {
        return "end of input".to_string();
    };
    if first.is_ascii_alphanumeric() || first == '_' {
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        format!("'{}'", &rest[..len])
    } else if rest.starts_with(":=") {
        "':='".to_string()
    } else {
        format!("'{first}'")
    }
}

fn describe(rule: &Rule) -> &'static str {
    match rule {
        Rule::cid => "class name",
        Rule::id => "identifier",
        Rule::integer => "integer",
        Rule::string => "string",
        Rule::class_def | Rule::class_kw => "'class'",
        Rule::method | Rule::selector | Rule::keyword_selector | Rule::unary_selector => {
            "method selector"
        }
        Rule::block => "block",
        Rule::block_params => "block parameter",
        Rule::statement => "statement",
        Rule::expr | Rule::expr_base | Rule::paren => "expression",
        Rule::keyword_tail | Rule::keyword_arg | Rule::unary_tail => "message",
        Rule::EOI => "end of input",
        _ => "token",
    }
}

fn convert_grammar_error(error: Error<Rule>, source: &str) -> CompileError {
    let pos = error_position(&error);
    let found = token_at(source, pos);

    let message = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let mut expected: Vec<&str> = positives.iter().map(describe).collect();
            expected.dedup();
            format!("unexpected {found}, expected {}", expected.join(" or "))
        }
        _ => format!("unexpected {found}"),
    };

    let end = (pos + found.len().saturating_sub(2).max(1)).min(source.len()).max(pos);
    CompileError::syntax(message, Span::new(pos, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let program = parse("").unwrap();
        assert!(program.classes.is_empty());
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| {
            format!(
                "class Main : Object {{ run [ | x := {}1{}. ] }}",
                "(".repeat(depth),
                ")".repeat(depth)
            )
        };
        assert!(parse(&nested(MAX_NESTING - 1)).is_ok());
        let err = parse(&nested(MAX_NESTING)).unwrap_err();
        assert_eq!(err.exit_code(), 22);
        // brackets inside strings and comments do not count
        let quoted = format!(
            "\"{}\" class Main : Object {{ run [ | x := '{}'. ] }}",
            "(".repeat(400),
            "[".repeat(400)
        );
        assert!(parse(&quoted).is_ok());
    }

    #[test]
    fn test_minimal_class() {
        let program = parse("class Main : Object { run [ | ] }").unwrap();
        assert_eq!(program.classes.len(), 1);
        let class = &program.classes[0];
        assert_eq!(class.name.value, "Main");
        assert_eq!(class.parent.value, "Object");
        assert_eq!(class.methods[0].selector.normalized(), "run");
        assert!(class.methods[0].body.params.is_empty());
    }

    #[test]
    fn test_keyword_selector_and_params() {
        let program = parse("class A : Object { at:put: [ :i :v | x := i. ] }").unwrap();
        let method = &program.classes[0].methods[0];
        assert_eq!(method.selector.normalized(), "at:put");
        assert_eq!(method.selector.message_name(), "at:put:");
        assert_eq!(method.body.params.len(), 2);
        assert_eq!(method.body.statements[0].target.value, "x");
    }

    #[test]
    fn test_expression_tails() {
        let src = "class A : Object { run [ | a := 1. b := a foo. c := a x: 1 y: 'z'. ] }";
        let program = parse(src).unwrap();
        let stmts = &program.classes[0].methods[0].body.statements;
        assert!(stmts[0].value.tail.is_empty());
        assert!(matches!(&stmts[1].value.tail, ExprTail::Unary(n) if n.value == "foo"));
        match &stmts[2].value.tail {
            ExprTail::Keyword(args) => {
                assert_eq!(args.len(), 2);
                assert_eq!(args[1].arg.value, ExprBase::Str("z".into()));
            }
            other => panic!("expected keyword tail, got {other:?}"),
        }
    }

    #[test]
    fn test_class_keyword_needs_boundary() {
        let err = parse("classMain : Object { }").unwrap_err();
        assert_eq!(err.exit_code(), 22);
    }

    #[test]
    fn test_lexical_error_code() {
        let err = parse("class Main : Object { run [ | x := 1 @ 2. ] }").unwrap_err();
        assert_eq!(err.exit_code(), 21);
        assert!(matches!(err, CompileError::Lexical { ref found, .. } if found == "@"));
    }

    #[test]
    fn test_integer_followed_by_letter_is_lexical() {
        let err = parse("class Main : Object { run [ | x := 12ab. ] }").unwrap_err();
        assert_eq!(err.exit_code(), 21);
    }

    #[test]
    fn test_grammar_error_code() {
        let err = parse("class Main : Object { run [ | x := 1 ] }").unwrap_err();
        assert_eq!(err.exit_code(), 22);
    }

    #[test]
    fn test_first_comment() {
        assert_eq!(first_comment("\"hello\" class"), Some("hello"));
        assert_eq!(first_comment("\"\" \"second\""), None);
        assert_eq!(first_comment("no comment"), None);
    }
}
