//! Compilation pipeline: parse → validate → lower → render.
//!
//! Every path through the crate, the CLI and the test suites included, goes
//! through [`Pipeline`]. A fresh symbol table is built for each call, so a
//! single pipeline can compile any number of sources.

use tracing::{debug, info_span};

use crate::{
    canonical::{self, CanonicalProgram},
    diagnostics::CompileError,
    syntax,
    validation::{self, SymbolTable},
};

// ============================================================================
// PIPELINE
// ============================================================================

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tree: CanonicalProgram,
    pub symbols: SymbolTable,
}

impl Compilation {
    pub fn to_xml(&self) -> String {
        canonical::to_xml(&self.tree)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    /// Whether to build the canonical tree after validation.
    pub emit_tree: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self { emit_tree: true }
    }
}

impl Pipeline {
    pub fn new(emit_tree: bool) -> Self {
        Self { emit_tree }
    }

    /// Runs every stage over `source`. Errors carry the source so they can
    /// be rendered with labels.
    pub fn run(&self, source: &str) -> Result<Option<Compilation>, CompileError> {
        self.run_inner(source).map_err(|e| e.with_source(source))
    }

    fn run_inner(&self, source: &str) -> Result<Option<Compilation>, CompileError> {
        let span = info_span!("compile", bytes = source.len());
        let _guard = span.enter();

        let program = syntax::parse(source)?;
        debug!(classes = program.classes.len(), "parsed");

        let symbols = validation::validate(&program)?;

        if !self.emit_tree {
            return Ok(None);
        }

        let tree = canonical::lower(&program, syntax::first_comment(source));
        debug!(classes = tree.classes.len(), "lowered to canonical tree");
        Ok(Some(Compilation { tree, symbols }))
    }
}

// ============================================================================
// CONVENIENCE ENTRY POINTS
// ============================================================================

/// Compiles `source` to the canonical XML document.
pub fn compile(source: &str) -> Result<String, CompileError> {
    let compilation = Pipeline::default().run(source)?;
    Ok(compilation.map(|c| c.to_xml()).unwrap_or_default())
}

/// Checks `source` without building the canonical tree.
pub fn validate(source: &str) -> Result<(), CompileError> {
    Pipeline::new(false).run(source).map(|_| ())
}
