//! Test harness for the parser against fixture files.
//!
//! Every `.yaml` file in test/yaml/ is parsed and compared with the value
//! read from the matching test/json/ file. Files in test/bad/ must fail;
//! when a `.error` file sits next to one, its first line is the expected
//! error message.

use std::fs;
use std::path::{Path, PathBuf};

use libyamler::{parse, parse_value, to_json_string, Value};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files with extension `ext` in a subdirectory of test/, sorted.
fn files_in_subdir(subdir: &str, ext: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(subdir).join(format!("*.{}", ext));
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("fixture pattern is valid")
        .flatten()
        .collect();
    files.sort();
    files
}

fn stem(path: &Path) -> String {
    path.file_stem().unwrap().to_string_lossy().to_string()
}

fn sibling(path: &Path, subdir: &str, ext: &str) -> PathBuf {
    test_root().join(subdir).join(format!("{}.{}", stem(path), ext))
}

#[test]
fn test_fixture_corpus_present() {
    assert!(!files_in_subdir("yaml", "yaml").is_empty());
    assert!(!files_in_subdir("bad", "yaml").is_empty());
}

#[test]
fn test_yaml_fixtures() {
    let mut passed = 0;
    let mut failures: Vec<String> = Vec::new();

    for path in files_in_subdir("yaml", "yaml") {
        let name = stem(&path);
        let input = fs::read_to_string(&path).unwrap();
        let expected_text = match fs::read_to_string(sibling(&path, "json", "json")) {
            Ok(text) => text,
            Err(_) => {
                failures.push(format!("{}: missing expected JSON", name));
                continue;
            }
        };

        let actual = match parse_value(&input) {
            Ok(value) => value,
            Err(e) => {
                failures.push(format!("{}: parse error: {}", name, e));
                continue;
            }
        };
        let expected = match parse_value(&expected_text) {
            Ok(value) => value,
            Err(e) => {
                failures.push(format!("{}: expected JSON does not parse: {}", name, e));
                continue;
            }
        };

        if actual != expected {
            failures.push(format!(
                "{}:\n  expected: {}\n  actual:   {}",
                name,
                to_json_string(&expected, -1),
                to_json_string(&actual, -1)
            ));
            continue;
        }
        passed += 1;
    }

    println!("Results: {} passed, {} failed", passed, failures.len());
    assert!(failures.is_empty(), "Failures:\n{}", failures.join("\n"));
}

/// Generated JSON reads back as the same value, compact and indented.
#[test]
fn test_yaml_fixtures_round_trip() {
    let mut failures: Vec<String> = Vec::new();

    for path in files_in_subdir("yaml", "yaml") {
        let name = stem(&path);
        let input = fs::read_to_string(&path).unwrap();
        let Ok(value) = parse_value(&input) else {
            continue;
        };
        for indent in [-1, 0, 2, 4] {
            let json = to_json_string(&value, indent);
            match parse_value(&json) {
                Ok(back) if back == value => {}
                Ok(back) => failures.push(format!(
                    "{} (indent {}): read back as {}",
                    name,
                    indent,
                    to_json_string(&back, -1)
                )),
                Err(e) => failures.push(format!("{} (indent {}): {}", name, indent, e)),
            }
        }
    }

    assert!(failures.is_empty(), "Failures:\n{}", failures.join("\n"));
}

#[test]
fn test_bad_fixtures() {
    let mut passed = 0;
    let mut failures: Vec<String> = Vec::new();

    for path in files_in_subdir("bad", "yaml") {
        let name = stem(&path);
        let input = fs::read_to_string(&path).unwrap();
        let expected = fs::read_to_string(sibling(&path, "bad", "error"))
            .ok()
            .and_then(|text| text.lines().next().map(str::to_string));

        match parse(&input) {
            Ok(docs) => {
                failures.push(format!(
                    "{}: expected an error, got {}",
                    name,
                    to_json_string(&docs, -1)
                ));
            }
            Err(e) => {
                if e.line() == 0 {
                    failures.push(format!("{}: error has no line: {}", name, e));
                    continue;
                }
                match expected {
                    Some(message) if message != e.message() => failures.push(format!(
                        "{}:\n  expected error: {}\n  actual error:   {}",
                        name,
                        message,
                        e.message()
                    )),
                    _ => passed += 1,
                }
            }
        }
    }

    println!("Results: {} passed, {} failed", passed, failures.len());
    assert!(failures.is_empty(), "Failures:\n{}", failures.join("\n"));
}

#[test]
fn test_error_display_has_excerpt() {
    let err = parse("a: 1\n  b: 2\n").unwrap_err();
    let text = err.to_string();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Illegal map indent (2 > 0) on line 2:"));
    assert_eq!(lines.next(), Some("  b: 2"));
    assert!(lines.next().unwrap().ends_with('^'));
}

#[test]
fn test_multi_document_access() {
    let docs = parse("--- {a: 1}\n--- [2]\n").unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs.first_map().and_then(|m| m.get_str("a")), Some(&Value::from(1)));
}
