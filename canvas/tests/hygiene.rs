//! Hygiene: scans the canvas sources for patterns the engine must not carry.
//!
//! The engine runs inside the browser tab, so a panic takes the whole
//! designer down and a swallowed error silently loses a commit. Every
//! pattern has a budget (zero unless noted). Budgets only ever go down.

use std::fs;
use std::path::Path;

struct Rule {
    pattern: &'static str,
    budget: usize,
    why: &'static str,
}

const RULES: &[Rule] = &[
    Rule { pattern: ".unwrap()", budget: 0, why: "panics" },
    Rule { pattern: ".expect(", budget: 0, why: "panics" },
    Rule { pattern: "panic!(", budget: 0, why: "panics" },
    Rule { pattern: "unreachable!(", budget: 0, why: "panics" },
    Rule { pattern: "todo!(", budget: 0, why: "unfinished stub" },
    Rule { pattern: "unimplemented!(", budget: 0, why: "unfinished stub" },
    Rule { pattern: "let _ =", budget: 0, why: "discards a result unseen" },
    Rule { pattern: ".ok()", budget: 0, why: "discards an error unseen" },
    Rule { pattern: "#[allow(dead_code)]", budget: 0, why: "hides dead code" },
    Rule { pattern: "println!(", budget: 0, why: "use tracing" },
    Rule { pattern: "eprintln!(", budget: 0, why: "use tracing" },
    Rule { pattern: "dbg!(", budget: 0, why: "debug leftover" },
];

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`; `*_test.rs` files are skipped.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Per-file line counts of `pattern`, ignoring `//` comment lines.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//"))
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")), "run from the canvas crate root");
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for rule in RULES {
        let found = hits(&files, rule.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > rule.budget {
            let detail = found
                .iter()
                .map(|(path, c)| format!("    {path}: {c}"))
                .collect::<Vec<_>>()
                .join("\n");
            failures.push(format!(
                "{} ({}): found {count}, max {}\n{detail}",
                rule.pattern, rule.why, rule.budget
            ));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}

#[test]
fn every_module_has_a_test_file_or_is_trivial() {
    let files = source_files();
    let missing: Vec<&str> = files
        .iter()
        .filter(|f| !f.path.ends_with("lib.rs") && !f.path.ends_with("consts.rs"))
        .filter(|f| !f.content.contains("#[cfg(test)]"))
        .map(|f| f.path.as_str())
        .collect();
    assert!(missing.is_empty(), "modules without tests: {missing:?}");
}
