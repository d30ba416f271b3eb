//! Selector arity must match the parameter count of the method body.

use crate::diagnostics::{CompileError, ErrorContext};
use crate::syntax::{MethodDef, Program};

pub fn check(program: &Program) -> Result<(), CompileError> {
    for class in &program.classes {
        for method in &class.methods {
            check_method(method)?;
        }
    }
    Ok(())
}

fn check_method(method: &MethodDef) -> Result<(), CompileError> {
    let expected = method.selector.arity();
    let actual = method.body.params.len();
    if expected == actual {
        return Ok(());
    }
    Err(CompileError::Arity {
        selector: method.selector.message_name(),
        expected,
        actual,
        ctx: ErrorContext::with_span(method.body.span),
    })
}
