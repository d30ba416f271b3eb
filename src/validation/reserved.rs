//! Reserved-word guard.
//!
//! Pseudo-variables, `class` and the built-in class names can never be bound
//! or used as a selector. The constructors are reserved in most positions as
//! well: `new` may still be sent as a unary message and `from:` may still be
//! used as a keyword.

use crate::builtins::{is_reserved, KEYWORD_CONSTRUCTOR, UNARY_CONSTRUCTOR};
use crate::diagnostics::{CompileError, ErrorContext, ReservedPosition};
use crate::syntax::{Block, Expr, ExprBase, ExprTail, Ident, Program, Selector};

/// Walks the program top-down and fails on the first reserved word found in
/// a binding or selector position.
pub fn check(program: &Program) -> Result<(), CompileError> {
    for class in &program.classes {
        for method in &class.methods {
            check_selector(&method.selector)?;
            check_block(&method.body)?;
        }
    }
    Ok(())
}

fn check_selector(selector: &Selector) -> Result<(), CompileError> {
    for part in selector.parts() {
        guard(part, ReservedPosition::MethodSelector)?;
    }
    Ok(())
}

fn check_block(block: &Block) -> Result<(), CompileError> {
    for param in &block.params {
        guard(param, ReservedPosition::BlockParameter)?;
    }
    for target in block.assigned_names() {
        guard(target, ReservedPosition::AssignmentTarget)?;
    }
    for statement in &block.statements {
        check_expr(&statement.value)?;
    }
    Ok(())
}

fn check_expr(expr: &Expr) -> Result<(), CompileError> {
    check_base(&expr.base.value)?;
    match &expr.tail {
        ExprTail::Empty => Ok(()),
        ExprTail::Unary(name) => guard(name, ReservedPosition::UnaryMessage),
        ExprTail::Keyword(args) => {
            for arg in args {
                guard(&arg.keyword, ReservedPosition::KeywordSelector)?;
            }
            for arg in args {
                check_base(&arg.arg.value)?;
            }
            Ok(())
        }
    }
}

fn check_base(base: &ExprBase) -> Result<(), CompileError> {
    match base {
        ExprBase::Block(block) => check_block(block),
        ExprBase::Paren(expr) => check_expr(expr),
        _ => Ok(()),
    }
}

fn forbidden(name: &str, position: ReservedPosition) -> bool {
    if is_reserved(name) {
        return true;
    }
    match position {
        ReservedPosition::UnaryMessage => name == KEYWORD_CONSTRUCTOR,
        ReservedPosition::KeywordSelector => name == UNARY_CONSTRUCTOR,
        ReservedPosition::AssignmentTarget
        | ReservedPosition::BlockParameter
        | ReservedPosition::MethodSelector => {
            name == UNARY_CONSTRUCTOR || name == KEYWORD_CONSTRUCTOR
        }
    }
}

fn guard(ident: &Ident, position: ReservedPosition) -> Result<(), CompileError> {
    if !forbidden(&ident.value, position) {
        return Ok(());
    }
    Err(CompileError::ReservedWord {
        name: ident.value.clone(),
        position,
        ctx: ErrorContext::with_span(ident.span),
    })
}
