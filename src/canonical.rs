//! Canonical program tree.
//!
//! The canonical tree is what downstream tools consume. It is built from a
//! validated [`Program`] by [`lower`] and rendered to XML by [`to_xml`].
//! Lowering is pure: the same program always produces the same tree, and
//! the same tree always renders to the same bytes.

pub mod xml;

use crate::builtins::{is_literal_class, literal_class_of, LANGUAGE};
use crate::syntax::{Block, Expr, ExprBase, ExprTail, Program};

pub use xml::to_xml;

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalProgram {
    pub language: &'static str,
    /// Text of the first comment in the source, if it had any.
    pub description: Option<String>,
    pub classes: Vec<CanonicalClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalClass {
    pub name: String,
    pub parent: String,
    pub methods: Vec<CanonicalMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMethod {
    /// Message form: `run`, `at:put:`.
    pub selector: String,
    pub block: CanonicalBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBlock {
    pub params: Vec<String>,
    pub assigns: Vec<CanonicalAssign>,
}

impl CanonicalBlock {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalAssign {
    pub target: String,
    pub value: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralClass {
    Integer,
    String,
    Nil,
    True,
    False,
    /// A reference to one of the primitive classes themselves.
    Class,
}

impl LiteralClass {
    pub fn as_str(self) -> &'static str {
        match self {
            LiteralClass::Integer => "Integer",
            LiteralClass::String => "String",
            LiteralClass::Nil => "Nil",
            LiteralClass::True => "True",
            LiteralClass::False => "False",
            LiteralClass::Class => "class",
        }
    }

    fn of_pseudo(name: &str) -> Option<Self> {
        match literal_class_of(name)? {
            "Nil" => Some(LiteralClass::Nil),
            "True" => Some(LiteralClass::True),
            "False" => Some(LiteralClass::False),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal { class: LiteralClass, value: String },
    Var(String),
    Block(CanonicalBlock),
    Send {
        selector: String,
        receiver: Box<Expression>,
        /// Arguments in keyword order; empty for unary sends.
        args: Vec<Expression>,
    },
}

// ============================================================================
// LOWERING
// ============================================================================

/// Builds the canonical tree of a validated program.
pub fn lower(program: &Program, description: Option<&str>) -> CanonicalProgram {
    let classes = program
        .classes
        .iter()
        .map(|class| CanonicalClass {
            name: class.name.value.clone(),
            parent: class.parent.value.clone(),
            methods: class
                .methods
                .iter()
                .map(|method| CanonicalMethod {
                    selector: method.selector.message_name(),
                    block: lower_block(&method.body),
                })
                .collect(),
        })
        .collect();

    CanonicalProgram {
        language: LANGUAGE,
        description: description.map(str::to_string),
        classes,
    }
}

fn lower_block(block: &Block) -> CanonicalBlock {
    CanonicalBlock {
        params: block.params.iter().map(|p| p.value.clone()).collect(),
        assigns: block
            .statements
            .iter()
            .map(|statement| CanonicalAssign {
                target: statement.target.value.clone(),
                value: lower_expr(&statement.value),
            })
            .collect(),
    }
}

fn lower_expr(expr: &Expr) -> Expression {
    let receiver = lower_base(&expr.base.value);
    match &expr.tail {
        ExprTail::Empty => receiver,
        ExprTail::Unary(name) => Expression::Send {
            selector: name.value.clone(),
            receiver: Box::new(receiver),
            args: Vec::new(),
        },
        ExprTail::Keyword(parts) => Expression::Send {
            selector: parts.iter().map(|p| format!("{}:", p.keyword.value)).collect(),
            receiver: Box::new(receiver),
            args: parts.iter().map(|p| lower_base(&p.arg.value)).collect(),
        },
    }
}

fn lower_base(base: &ExprBase) -> Expression {
    match base {
        ExprBase::Int(text) => Expression::Literal {
            class: LiteralClass::Integer,
            value: text.clone(),
        },
        ExprBase::Str(text) => Expression::Literal {
            class: LiteralClass::String,
            value: text.clone(),
        },
        ExprBase::Id(name) => match LiteralClass::of_pseudo(name) {
            Some(class) => Expression::Literal {
                class,
                value: name.clone(),
            },
            None => Expression::Var(name.clone()),
        },
        ExprBase::ClassId(name) if is_literal_class(name) => Expression::Literal {
            class: LiteralClass::Class,
            value: name.clone(),
        },
        ExprBase::ClassId(name) => Expression::Var(name.clone()),
        ExprBase::Block(block) => Expression::Block(lower_block(block)),
        ExprBase::Paren(inner) => lower_expr(inner),
    }
}
