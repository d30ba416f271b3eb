// Regression tests for the `sol25` binary: exit codes, stdout/stderr split.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use assert_cmd::Command;
use predicates::{
    prelude::PredicateBooleanExt,
    str::{contains, starts_with},
};

fn sol25() -> Command {
    Command::cargo_bin("sol25").unwrap()
}

#[test]
fn help_exits_zero() {
    sol25()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Usage"));
    sol25().arg("-h").assert().code(0);
}

#[test]
fn unknown_argument_is_usage_error() {
    sol25()
        .arg("--verbose")
        .assert()
        .code(10)
        .stdout("")
        .stderr(starts_with("error:"));
    sol25().arg("program.sol").assert().code(10);
}

#[test]
fn help_with_anything_else_is_usage_error() {
    sol25()
        .args(["--help", "extra"])
        .assert()
        .code(10)
        .stdout("");
    sol25().arg("-hh").assert().code(10).stdout("");
    sol25()
        .arg("--")
        .write_stdin("class Main : Object { run [ | ] }")
        .assert()
        .code(10)
        .stdout("");
}

#[test]
fn compiles_stdin_to_stdout() {
    sol25()
        .write_stdin("class Main : Object { run [ | ] }")
        .assert()
        .success()
        .stderr("")
        .stdout(
            starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")
                .and(contains("<class name=\"Main\" parent=\"Object\">"))
                .and(contains("<block arity=\"0\"/>")),
        );
}

#[test]
fn failure_prints_one_line_and_no_tree() {
    let assert = sol25()
        .write_stdin("class Main : Object { run [ | x := y. ] }")
        .assert()
        .code(32)
        .stdout("");
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert_eq!(stderr.lines().count(), 1, "{stderr}");
    assert!(stderr.contains("undefined variable 'y'"));
    assert!(stderr.contains("line 1"));
}

#[test]
fn exit_codes_by_category() {
    let cases = [
        ("class Main : Object { run [ | x := $. ] }", 21),
        ("class Main : Object { run [ | x := 1 ] }", 22),
        ("class Main : Object { run [ | nil := 1. ] }", 22),
        ("class Main : Object { }", 31),
        ("class Main : Nope { run [ | ] }", 32),
        ("class Main : Object { run [ :a | ] }", 33),
        ("class Main : Object { run [ | ] f: [ :a | a := 1. ] }", 34),
        ("class Main : Object { run [ | ] } class Main : Object { }", 35),
    ];
    for (source, code) in cases {
        sol25().write_stdin(source).assert().code(code);
    }
}

#[test]
fn invalid_utf8_is_lexical() {
    sol25()
        .write_stdin(b"class Main : Object { run [ | x := '\xff'. ] }".to_vec())
        .assert()
        .code(21);
}

#[test]
fn empty_input_has_no_entry_point() {
    sol25().write_stdin("").assert().code(31);
}
