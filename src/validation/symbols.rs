//! Symbol tables and the two declaration/reference passes.
//!
//! Classes and methods may be used before they are declared, so the tables
//! are filled in two walks over the same tree:
//!
//! - [`declare`] records every class (with its parent) and every method
//!   selector, rejecting duplicates.
//! - [`resolve`] checks that each parent and each identifier in an
//!   expression refers to something that exists, and records the variables
//!   of every block together with a shallow type hint.
//!
//! A fresh [`SymbolTable`] is created for every compilation.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::builtins::{
    builtin_keyword_parts, is_builtin_unary_method, is_constructor,
    is_pseudo_variable, literal_class_of, BUILTIN_CLASSES,
};
use crate::diagnostics::CompileError;
use crate::syntax::{Block, Expr, ExprBase, ExprTail, Ident, Program, Selector, Span, Spanned};

// ============================================================================
// CLASS FOREST
// ============================================================================

/// One class and its place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: String,
    /// `None` only for built-in roots.
    pub parent: Option<String>,
    /// Direct subclasses in declaration order.
    pub children: Vec<String>,
    pub builtin: bool,
    pub span: Option<Span>,
}

/// Single-inheritance hierarchy rooted at the built-in classes.
///
/// A parent may be recorded before it is declared; the child is attached to
/// the parent's `children` once the parent shows up.
#[derive(Debug, Clone)]
pub struct ClassForest {
    classes: HashMap<String, ClassDescriptor>,
    order: Vec<String>,
}

impl Default for ClassForest {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassForest {
    /// A forest containing only the built-in roots.
    pub fn new() -> Self {
        let mut forest = Self {
            classes: HashMap::new(),
            order: Vec::new(),
        };
        for name in BUILTIN_CLASSES {
            forest.insert(ClassDescriptor {
                name: name.to_string(),
                parent: None,
                children: Vec::new(),
                builtin: true,
                span: None,
            });
        }
        forest
    }

    fn insert(&mut self, descriptor: ClassDescriptor) {
        self.order.push(descriptor.name.clone());
        self.classes.insert(descriptor.name.clone(), descriptor);
    }

    /// Records a user class. Fails if another user class has the same name.
    ///
    /// A user class may reuse a built-in name; it then replaces the built-in
    /// root and keeps the subclasses already recorded under it.
    pub fn declare(&mut self, name: &Ident, parent: &Ident) -> Result<(), CompileError> {
        let previous = self.classes.get(&name.value);
        if previous.is_some_and(|c| !c.builtin) {
            return Err(CompileError::redefinition("class", &name.value, name.span));
        }

        let descriptor = ClassDescriptor {
            name: name.value.clone(),
            parent: Some(parent.value.clone()),
            children: match previous {
                Some(builtin) => builtin.children.clone(),
                None => self.orphans_of(&name.value),
            },
            builtin: false,
            span: Some(name.span),
        };
        if previous.is_some() {
            trace!(class = %name.value, "user class replaces built-in");
            self.classes.insert(name.value.clone(), descriptor);
        } else {
            self.insert(descriptor);
        }

        if let Some(descriptor) = self.classes.get_mut(&parent.value) {
            descriptor.children.push(name.value.clone());
        }

        trace!(class = %name.value, parent = %parent.value, "declared class");
        Ok(())
    }

    /// Classes already naming `name` as their parent.
    fn orphans_of(&self, name: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|c| self.classes[c.as_str()].parent.as_deref() == Some(name))
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.classes.get(name).is_some_and(|c| c.builtin)
    }

    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.classes.get(name)?.parent.as_deref()
    }

    pub fn children_of(&self, name: &str) -> &[String] {
        self.classes
            .get(name)
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    /// The class `super` refers to inside `name`: its parent, or the class
    /// itself when it is a root.
    pub fn super_of<'a>(&'a self, name: &'a str) -> &'a str {
        self.parent_of(name).unwrap_or(name)
    }

    /// Parent chain of `name`, nearest first. Stops at a root, at an unknown
    /// class, or when the chain loops back on itself.
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = self.parent_of(name);
        while let Some(parent) = current {
            if parent == name || chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }

    pub fn user_class_count(&self) -> usize {
        self.classes.values().filter(|c| !c.builtin).count()
    }

    /// Class names in declaration order, built-ins first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

// ============================================================================
// METHOD TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub class: String,
    /// Normalized selector: `run` or `at:put`.
    pub selector: String,
    pub arity: usize,
    pub span: Span,
}

/// Every method declared by the program.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: Vec<MethodDescriptor>,
    by_class: HashMap<String, HashSet<String>>,
    unary_names: HashSet<String>,
    keyword_parts: HashSet<String>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a method of `class`. A selector may appear once per class and
    /// may not reuse the name of a built-in unary method.
    pub fn declare(&mut self, class: &str, selector: &Selector) -> Result<(), CompileError> {
        let normalized = selector.normalized();
        let span = selector.span();

        if is_builtin_unary_method(&normalized) {
            return Err(CompileError::redefinition("built-in method", normalized, span));
        }
        let declared = self.by_class.entry(class.to_string()).or_default();
        if !declared.insert(normalized.clone()) {
            return Err(CompileError::redefinition("method", normalized, span));
        }

        match selector {
            Selector::Unary(name) => {
                self.unary_names.insert(name.value.clone());
            }
            Selector::Keyword(parts) => {
                self.keyword_parts
                    .extend(parts.iter().map(|p| p.value.clone()));
            }
        }

        trace!(class, selector = %normalized, "declared method");
        self.methods.push(MethodDescriptor {
            class: class.to_string(),
            selector: normalized,
            arity: selector.arity(),
            span,
        });
        Ok(())
    }

    pub fn lookup(&self, class: &str, selector: &str) -> Option<&MethodDescriptor> {
        self.methods
            .iter()
            .find(|m| m.class == class && m.selector == selector)
    }

    /// True if `name` can be sent as a unary message to some receiver.
    pub fn understands_unary(&self, name: &str) -> bool {
        self.unary_names.contains(name) || is_builtin_unary_method(name)
    }

    /// True if `name` is a keyword part of some declared or built-in selector.
    pub fn understands_keyword(&self, name: &str) -> bool {
        self.keyword_parts.contains(name) || builtin_keyword_parts().any(|part| part == name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter()
    }
}

// ============================================================================
// BLOCK SCOPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Parameter,
    Local,
}

/// A variable visible inside one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    pub name: String,
    pub kind: BindingKind,
    /// Class name guessed from the assigned expression. Advisory only: it is
    /// never checked against later uses.
    pub type_hint: Option<String>,
    pub span: Span,
}

/// The variables of a single block. Blocks do not see the variables of the
/// blocks around them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockScope {
    pub span: Span,
    /// Class whose method contains the block.
    pub class: String,
    bindings: Vec<VariableBinding>,
}

impl BlockScope {
    fn new(span: Span, class: &str) -> Self {
        Self {
            span,
            class: class.to_string(),
            bindings: Vec::new(),
        }
    }

    fn bind(&mut self, ident: &Ident, kind: BindingKind) {
        if self.lookup(&ident.value).is_some() {
            return;
        }
        self.bindings.push(VariableBinding {
            name: ident.value.clone(),
            kind,
            type_hint: None,
            span: ident.span,
        });
    }

    fn set_hint(&mut self, name: &str, hint: Option<String>) {
        if let Some(binding) = self.bindings.iter_mut().find(|b| b.name == name) {
            binding.type_hint = hint;
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&VariableBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    pub fn bindings(&self) -> &[VariableBinding] {
        &self.bindings
    }
}

// ============================================================================
// SYMBOL TABLE
// ============================================================================

/// Everything the analysis passes learn about one program.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub classes: ClassForest,
    pub methods: MethodTable,
    scopes: Vec<BlockScope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block scopes in top-down traversal order.
    pub fn scopes(&self) -> &[BlockScope] {
        &self.scopes
    }

    /// Scope of the block starting at `span`.
    pub fn scope_at(&self, span: Span) -> Option<&BlockScope> {
        self.scopes.iter().find(|s| s.span == span)
    }
}

// ============================================================================
// PASS 1: DECLARATIONS
// ============================================================================

/// Collects class and method declarations into a new symbol table.
pub fn declare(program: &Program) -> Result<SymbolTable, CompileError> {
    let mut table = SymbolTable::new();
    for class in &program.classes {
        table.classes.declare(&class.name, &class.parent)?;
        for method in &class.methods {
            table.methods.declare(&class.name.value, &method.selector)?;
        }
    }
    Ok(table)
}

// ============================================================================
// PASS 2: REFERENCES
// ============================================================================

/// Validates every parent and identifier reference, filling in block scopes.
pub fn resolve(program: &Program, table: &mut SymbolTable) -> Result<(), CompileError> {
    let mut resolver = Resolver {
        classes: &table.classes,
        methods: &table.methods,
        current_class: "",
        active: Vec::new(),
        finished: Vec::new(),
    };

    for class in &program.classes {
        let parent = &class.parent;
        if !resolver.classes.is_defined(&parent.value) {
            return Err(CompileError::undefined("parent class", &parent.value, parent.span));
        }
        resolver.current_class = &class.name.value;
        for method in &class.methods {
            resolver.resolve_block(&method.body)?;
        }
    }

    let scopes: Vec<BlockScope> = resolver.finished.into_iter().flatten().collect();
    table.scopes = scopes;
    Ok(())
}

struct Resolver<'a> {
    classes: &'a ClassForest,
    methods: &'a MethodTable,
    current_class: &'a str,
    /// Scopes of the blocks currently being resolved, innermost last.
    active: Vec<BlockScope>,
    /// Completed scopes, indexed by the order their blocks were entered.
    finished: Vec<Option<BlockScope>>,
}

impl<'a> Resolver<'a> {
    fn resolve_block(&mut self, block: &Block) -> Result<(), CompileError> {
        let slot = self.finished.len();
        self.finished.push(None);

        let mut scope = BlockScope::new(block.span, self.current_class);
        for param in &block.params {
            scope.bind(param, BindingKind::Parameter);
        }
        self.active.push(scope);

        for statement in &block.statements {
            if let Some(scope) = self.active.last_mut() {
                scope.bind(&statement.target, BindingKind::Local);
            }
            let hint = self.resolve_expr(&statement.value)?;
            if let Some(scope) = self.active.last_mut() {
                scope.set_hint(&statement.target.value, hint);
            }
        }

        self.finished[slot] = self.active.pop();
        Ok(())
    }

    fn is_local(&self, name: &str) -> bool {
        self.active
            .last()
            .is_some_and(|scope| scope.lookup(name).is_some())
    }

    /// Resolves `expr` and returns the type hint of its outermost operand.
    fn resolve_expr(&mut self, expr: &Expr) -> Result<Option<String>, CompileError> {
        let hint = self.resolve_base(&expr.base)?;
        match &expr.tail {
            ExprTail::Empty => {}
            ExprTail::Unary(name) => self.resolve_unary(name)?,
            ExprTail::Keyword(args) => {
                for arg in args {
                    self.resolve_keyword(&arg.keyword)?;
                    self.resolve_base(&arg.arg)?;
                }
            }
        }
        Ok(hint)
    }

    fn resolve_base(&mut self, base: &Spanned<ExprBase>) -> Result<Option<String>, CompileError> {
        match &base.value {
            ExprBase::Int(_) => Ok(Some("Integer".to_string())),
            ExprBase::Str(_) => Ok(Some("String".to_string())),
            ExprBase::Id(name) => self.resolve_variable(name, base.span),
            ExprBase::ClassId(name) => {
                if !self.classes.is_defined(name) {
                    return Err(CompileError::undefined("class", name, base.span));
                }
                Ok(Some(name.clone()))
            }
            ExprBase::Block(block) => {
                self.resolve_block(block)?;
                Ok(Some("Block".to_string()))
            }
            ExprBase::Paren(expr) => self.resolve_expr(expr),
        }
    }

    fn resolve_variable(&self, name: &str, span: Span) -> Result<Option<String>, CompileError> {
        if self.is_local(name) || is_constructor(name) {
            return Ok(None);
        }
        if !is_pseudo_variable(name) {
            return Err(CompileError::undefined("variable", name, span));
        }
        let hint = match name {
            "self" => self.current_class,
            "super" => self.classes.super_of(self.current_class),
            literal => literal_class_of(literal).unwrap_or_default(),
        };
        Ok(Some(hint.to_string()))
    }

    fn resolve_unary(&self, name: &Ident) -> Result<(), CompileError> {
        let known = self.is_local(name.value.as_str())
            || is_pseudo_variable(&name.value)
            || is_constructor(&name.value)
            || self.methods.understands_unary(&name.value);
        if known {
            return Ok(());
        }
        Err(CompileError::undefined("message", &name.value, name.span))
    }

    fn resolve_keyword(&self, keyword: &Ident) -> Result<(), CompileError> {
        let known = self.methods.understands_keyword(&keyword.value)
            || is_constructor(&keyword.value)
            || is_pseudo_variable(&keyword.value);
        if known {
            return Ok(());
        }
        Err(CompileError::undefined("keyword selector", &keyword.value, keyword.span))
    }
}
