// tests/parser_tests.rs

use sol25::syntax::{first_comment, parse, ExprBase, ExprTail, Program, Selector};

fn parse_ok(source: &str) -> Program {
    parse(source).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

fn code_of(source: &str) -> i32 {
    parse(source).unwrap_err().exit_code()
}

#[test]
fn parsing_is_deterministic() {
    let source = "class Main : Object { run [ | x := (1 plus: 2) asString. ] }";
    assert_eq!(parse_ok(source), parse_ok(source));
}

#[test]
fn comments_are_whitespace() {
    let source = "\"one\" class \"two\" Main : Object { \"three\" run [ | ] }";
    let program = parse_ok(source);
    assert_eq!(program.classes[0].name.value, "Main");
    assert_eq!(first_comment(source), Some("one"));
}

#[test]
fn empty_first_comment_gives_no_description() {
    assert_eq!(first_comment("\"\" class Main : Object { }"), None);
    assert_eq!(first_comment("class Main : Object { }"), None);
}

#[test]
fn selectors() {
    let program = parse_ok("class A : Object { run [ | ] at:put: [ :a :b | ] }");
    let methods = &program.classes[0].methods;
    assert!(matches!(&methods[0].selector, Selector::Unary(name) if name.value == "run"));
    assert_eq!(methods[1].selector.normalized(), "at:put");
    assert_eq!(methods[1].selector.message_name(), "at:put:");
    assert_eq!(methods[1].selector.arity(), 2);
}

#[test]
fn signed_integers_and_escapes() {
    let program = parse_ok(r"class A : Object { f [ | a := -12. b := +3. c := 'x\n\\\'y'. ] }");
    let statements = &program.classes[0].methods[0].body.statements;
    assert_eq!(statements[0].value.base.value, ExprBase::Int("-12".into()));
    assert_eq!(statements[1].value.base.value, ExprBase::Int("+3".into()));
    assert_eq!(statements[2].value.base.value, ExprBase::Str(r"x\n\\\'y".into()));
}

#[test]
fn keyword_arguments_are_bases() {
    let program = parse_ok("class A : Object { f [ | a := x foo: [ :y | ] bar: (z baz). ] }");
    let expr = &program.classes[0].methods[0].body.statements[0].value;
    let ExprTail::Keyword(args) = &expr.tail else {
        panic!("expected keyword tail");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(args[0].arg.value, ExprBase::Block(_)));
    assert!(matches!(args[1].arg.value, ExprBase::Paren(_)));
}

#[test]
fn lexical_errors() {
    assert_eq!(code_of("class Main : Object { run [ | x := 1 ~ 2. ] }"), 21);
    assert_eq!(code_of("class Main : Object { run [ | x := 'bad \\q'. ] }"), 21);
    assert_eq!(code_of("class Main : Object { run [ | x := 'open. ] }"), 21);
    assert_eq!(code_of("class Main : Object { run [ | x := 3x. ] }"), 21);
}

#[test]
fn grammar_errors() {
    assert_eq!(code_of("class Main Object { }"), 22);
    assert_eq!(code_of("class main : Object { }"), 22);
    assert_eq!(code_of("class Main : Object { run [ x := 1. ] }"), 22);
    assert_eq!(code_of("class Main : Object { run [ | x := . ] }"), 22);
    assert_eq!(code_of("Main : Object { }"), 22);
}

#[test]
fn raw_newline_inside_string() {
    let program = parse_ok("class A : Object { f [ | s := 'a\nb'. ] }");
    let statement = &program.classes[0].methods[0].body.statements[0];
    assert_eq!(statement.value.base.value, ExprBase::Str("a\nb".into()));
}

#[test]
fn deep_nesting_is_a_syntax_error() {
    let nested = |depth: usize| {
        format!(
            "class Main : Object {{ run [ | x := {}1{}. ] }}",
            "(".repeat(depth),
            ")".repeat(depth)
        )
    };
    parse_ok(&nested(100));
    let err = parse(&nested(20_000)).unwrap_err();
    assert_eq!(err.exit_code(), 22);
    assert!(err.to_string().contains("nested"));
    assert_eq!(code_of(&"[ ".repeat(300)), 22);
}
