//! The fixed environment every SOL25 program starts from: built-in classes,
//! pseudo-variables, reserved words and the methods of the standard classes.

/// Classes that exist before any user declaration. They are the roots of the
/// class forest.
pub const BUILTIN_CLASSES: &[&str] = &["Object", "Nil", "True", "False", "Integer", "String", "Block"];

/// Identifiers that are always in scope.
pub const PSEUDO_VARIABLES: &[&str] = &["self", "super", "nil", "true", "false"];

/// Lowercase identifiers that may never be bound or used as a selector.
pub const RESERVED_IDENTIFIERS: &[&str] = &["class", "self", "super", "nil", "true", "false"];

/// Built-in classes whose bare name lowers to a class literal.
pub const LITERAL_CLASSES: &[&str] = &["Integer", "String", "Nil", "True", "False"];

pub const UNARY_CONSTRUCTOR: &str = "new";
pub const KEYWORD_CONSTRUCTOR: &str = "from";

/// Unary messages understood by the standard classes.
pub const BUILTIN_UNARY_METHODS: &[&str] = &[
    "new", "asString", "isNumber", "isString", "isBlock", "isNil", "asInteger", "print", "read",
    "not", "value",
];

/// Keyword messages understood by the standard classes, in message form.
pub const BUILTIN_KEYWORD_METHODS: &[&str] = &[
    "from:",
    "whileTrue:",
    "value:",
    "identicalTo:",
    "equalTo:",
    "greaterThan:",
    "plus:",
    "minus:",
    "multiplyBy:",
    "divBy:",
    "timesRepeat:",
    "concatenateWith:",
    "startsWith:endsBefore:",
    "and:",
    "or:",
    "ifTrue:ifFalse:",
];

pub const ENTRY_CLASS: &str = "Main";
pub const ENTRY_METHOD: &str = "run";

/// Language tag carried by the canonical program node.
pub const LANGUAGE: &str = "SOL25";

pub fn is_builtin_class(name: &str) -> bool {
    BUILTIN_CLASSES.contains(&name)
}

pub fn is_pseudo_variable(name: &str) -> bool {
    PSEUDO_VARIABLES.contains(&name)
}

pub fn is_literal_class(name: &str) -> bool {
    LITERAL_CLASSES.contains(&name)
}

pub fn is_constructor(name: &str) -> bool {
    name == UNARY_CONSTRUCTOR || name == KEYWORD_CONSTRUCTOR
}

/// Reserved identifiers plus every built-in class name.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_IDENTIFIERS.contains(&name) || is_builtin_class(name)
}

pub fn is_builtin_unary_method(name: &str) -> bool {
    BUILTIN_UNARY_METHODS.contains(&name)
}

/// Every keyword part of the built-in keyword messages (`ifTrue`, `ifFalse`, ...).
pub fn builtin_keyword_parts() -> impl Iterator<Item = &'static str> {
    BUILTIN_KEYWORD_METHODS
        .iter()
        .flat_map(|selector| selector.split(':'))
        .filter(|part| !part.is_empty())
}

/// Class of the object a literal pseudo-variable denotes.
pub fn literal_class_of(name: &str) -> Option<&'static str> {
    match name {
        "nil" => Some("Nil"),
        "true" => Some("True"),
        "false" => Some("False"),
        _ => None,
    }
}
