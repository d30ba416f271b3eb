//! Entry-point check: the program must define class `Main` with a unary
//! instance method `run`.

use tracing::trace;

use crate::builtins::{ENTRY_CLASS, ENTRY_METHOD};
use crate::diagnostics::{CompileError, ErrorContext};
use crate::syntax::{Program, Selector};

pub fn check(program: &Program) -> Result<(), CompileError> {
    let mut found = false;

    for class in &program.classes {
        let inside_main = class.name.value == ENTRY_CLASS;
        for method in &class.methods {
            if inside_main && is_entry_selector(&method.selector) {
                trace!(span = ?method.span, "entry point");
                found = true;
            }
        }
    }

    if found {
        return Ok(());
    }
    Err(CompileError::MissingEntryPoint {
        ctx: ErrorContext::none(),
    }
    .with_help("declare `class Main : Object { run [ | ] }`"))
}

fn is_entry_selector(selector: &Selector) -> bool {
    matches!(selector, Selector::Unary(name) if name.value == ENTRY_METHOD)
}
