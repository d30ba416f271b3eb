//! Shared helpers for the integration suites: fixture discovery and golden
//! comparison.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use difference::{Changeset, Difference};
use walkdir::WalkDir;

/// What a fixture is expected to do, taken from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// `ok_*.sol`: compiles and matches the sibling `.xml` file.
    Golden(PathBuf),
    /// `eNN_*.sol`: fails with exit code `NN`.
    ExitCode(i32),
}

#[derive(Debug, Clone)]
pub struct Fixture {
    pub path: PathBuf,
    pub source: String,
    pub expectation: Expectation,
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Loads every `.sol` file under `dir`, sorted by path.
pub fn load_fixtures(dir: &Path) -> Vec<Fixture> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sol"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let source = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
            let expectation = expectation_for(&path);
            Fixture {
                path,
                source,
                expectation,
            }
        })
        .collect()
}

fn expectation_for(path: &Path) -> Expectation {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem.starts_with("ok_") {
        return Expectation::Golden(path.with_extension("xml"));
    }
    let code = stem
        .strip_prefix('e')
        .and_then(|rest| rest.split('_').next())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or_else(|| panic!("fixture name must start with ok_ or eNN_: {}", path.display()));
    Expectation::ExitCode(code)
}

/// Line diff of `expected` against `actual`, empty when they match.
pub fn render_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    if changeset.distance == 0 {
        return String::new();
    }
    let mut out = String::new();
    for diff in &changeset.diffs {
        let (prefix, text) = match diff {
            Difference::Same(text) => (" ", text),
            Difference::Add(text) => ("+", text),
            Difference::Rem(text) => ("-", text),
        };
        for line in text.lines() {
            out.push_str(prefix);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
