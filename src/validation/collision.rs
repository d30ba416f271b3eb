//! Block parameters must be distinct and may not be assigned in the block.

use std::collections::HashSet;

use crate::diagnostics::{CompileError, ErrorContext};
use crate::syntax::{Block, Program};

use super::walk_blocks;

pub fn check(program: &Program) -> Result<(), CompileError> {
    walk_blocks(program, &mut check_block)
}

fn check_block(block: &Block) -> Result<(), CompileError> {
    let mut params = HashSet::new();
    for param in &block.params {
        if !params.insert(param.value.as_str()) {
            return Err(CompileError::redefinition("block parameter", &param.value, param.span));
        }
    }

    for target in block.assigned_names() {
        if params.contains(target.value.as_str()) {
            return Err(CompileError::Collision {
                name: target.value.clone(),
                ctx: ErrorContext::with_span(target.span),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn check_src(src: &str) -> Result<(), CompileError> {
        check(&parse(src).unwrap())
    }

    #[test]
    fn parameter_assigned_locally() {
        let err = check_src("class Main : Object { run: [ :x | x := 1. ] }").unwrap_err();
        assert_eq!(err.exit_code(), 34);
    }

    #[test]
    fn parameter_read_is_fine() {
        assert!(check_src("class Main : Object { run: [ :x | y := x. ] }").is_ok());
    }

    #[test]
    fn duplicate_parameter_reported_first() {
        let err = check_src("class Main : Object { a:b: [ :x :x | x := 1. ] }").unwrap_err();
        assert_eq!(err.exit_code(), 35);
    }

    #[test]
    fn nested_blocks_are_checked() {
        let err = check_src("class Main : Object { run [ | f := [ :y | y := 2. ]. ] }").unwrap_err();
        assert!(matches!(err, CompileError::Collision { ref name, .. } if name == "y"));
    }

    #[test]
    fn same_name_in_sibling_blocks() {
        let src = "class Main : Object { run [ | y := [ :x | ]. z := [ | x := 1. ]. ] }";
        assert!(check_src(src).is_ok());
    }
}
