//! Static semantic validation.
//!
//! The passes run in a fixed order and the first failing pass aborts the
//! compilation, so the order below is also the error priority:
//!
//! 1. [`reserved`] - reserved words in binding or selector positions (22)
//! 2. [`entry_point`] - `Main` with a unary `run` method (31)
//! 3. [`symbols::declare`] - class and method declarations (35)
//! 4. [`symbols::resolve`] - parents, variables and selectors resolve (32)
//! 5. [`arity`] - selector arity matches the body block (33)
//! 6. [`collision`] - parameters vs. assigned locals (34, 35)

pub mod arity;
pub mod collision;
pub mod entry_point;
pub mod reserved;
pub mod symbols;

use tracing::debug;

use crate::diagnostics::CompileError;
use crate::syntax::{Block, Expr, ExprBase, ExprTail, Program};

pub use symbols::{
    BindingKind, BlockScope, ClassDescriptor, ClassForest, MethodDescriptor, MethodTable,
    SymbolTable, VariableBinding,
};

/// Runs every pass in priority order and returns the symbol table built along the way.
pub fn validate(program: &Program) -> Result<SymbolTable, CompileError> {
    reserved::check(program)?;
    debug!("reserved-word guard passed");

    entry_point::check(program)?;
    debug!("entry point found");

    let mut table = symbols::declare(program)?;
    debug!(
        classes = table.classes.user_class_count(),
        methods = table.methods.len(),
        "declarations collected"
    );

    symbols::resolve(program, &mut table)?;
    debug!(blocks = table.scopes().len(), "references resolved");

    arity::check(program)?;
    collision::check(program)?;
    debug!("arity and collision checks passed");

    Ok(table)
}

// ============================================================================
// TRAVERSAL HELPERS
// ============================================================================

/// Visits every block of the program top-down, left to right: a block is
/// visited before the blocks nested inside its statements.
pub fn walk_blocks<F>(program: &Program, visit: &mut F) -> Result<(), CompileError>
where
    F: FnMut(&Block) -> Result<(), CompileError>,
{
    for class in &program.classes {
        for method in &class.methods {
            walk_block(&method.body, visit)?;
        }
    }
    Ok(())
}

fn walk_block<F>(block: &Block, visit: &mut F) -> Result<(), CompileError>
where
    F: FnMut(&Block) -> Result<(), CompileError>,
{
    visit(block)?;
    for statement in &block.statements {
        walk_expr(&statement.value, visit)?;
    }
    Ok(())
}

fn walk_expr<F>(expr: &Expr, visit: &mut F) -> Result<(), CompileError>
where
    F: FnMut(&Block) -> Result<(), CompileError>,
{
    walk_base(&expr.base.value, visit)?;
    if let ExprTail::Keyword(args) = &expr.tail {
        for arg in args {
            walk_base(&arg.arg.value, visit)?;
        }
    }
    Ok(())
}

fn walk_base<F>(base: &ExprBase, visit: &mut F) -> Result<(), CompileError>
where
    F: FnMut(&Block) -> Result<(), CompileError>,
{
    match base {
        ExprBase::Block(block) => walk_block(block, visit),
        ExprBase::Paren(expr) => walk_expr(expr, visit),
        ExprBase::Int(_) | ExprBase::Str(_) | ExprBase::Id(_) | ExprBase::ClassId(_) => Ok(()),
    }
}
