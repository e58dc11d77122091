//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No thread sleeps, and timers only where delayed effects are scheduled
//! - No blocking I/O in async code of the core crate
//! - The core crate stays free of terminal, CLI and subscriber dependencies
//!
//! The helpers below locate the workspace and yield the production lines of
//! each source file (comments and `#[cfg(test)]` modules stripped).

use std::fs;
use std::path::{Path, PathBuf};

/// A production line of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number
    pub number: usize,
    /// Line content with any `//` comment removed
    pub code: String,
}

/// Workspace root (two levels above this package)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Production lines of `source`: stops at the first `#[cfg(test)]` and drops
/// `//` comments
#[must_use]
pub fn production_lines(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| SourceLine {
            number: idx + 1,
            code: strip_comment(line).to_string(),
        })
        .collect()
}

/// Read a file's production lines; unreadable files yield nothing
#[must_use]
pub fn production_lines_of(path: &Path) -> Vec<SourceLine> {
    fs::read_to_string(path)
        .map(|content| production_lines(&content))
        .unwrap_or_default()
}

/// Drop a trailing `//` comment, ignoring `//` inside string literals such as URLs
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut prev = '\0';
    for (i, c) in line.char_indices() {
        match c {
            '"' if prev != '\\' => in_string = !in_string,
            '/' if !in_string && prev == '/' => return &line[..i - 1],
            _ => {}
        }
        prev = c;
    }
    line
}

/// Whether the function enclosing `lines[idx]` is `async`
///
/// Scans backwards to the nearest function signature.
#[must_use]
pub fn is_in_async_function(lines: &[SourceLine], idx: usize) -> bool {
    for line in lines[..=idx].iter().rev() {
        let code = line.code.trim();
        if code.contains("async fn ") || code.contains("async move") {
            return true;
        }
        if code.starts_with("fn ") || code.contains(" fn ") {
            return false;
        }
    }
    false
}

/// The `[dependencies]` names of a Cargo manifest
#[must_use]
pub fn dependency_names(manifest: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut in_deps = false;
    for line in manifest.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps = line == "[dependencies]";
            continue;
        }
        if !in_deps || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// note\n#[cfg(test)]\nmod tests {\n    fn b() {}\n}\n";
        let lines = production_lines(source);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].code, "fn a() {}");
        assert_eq!(lines[1].code, "");
    }

    #[test]
    fn test_comment_stripping_keeps_urls() {
        assert_eq!(
            strip_comment("let u = \"http://localhost\"; // base"),
            "let u = \"http://localhost\"; "
        );
        assert_eq!(strip_comment("    std::thread::sleep(d); // no"), "    std::thread::sleep(d); ");
    }

    #[test]
    fn test_async_detection() {
        let lines = production_lines(
            "pub async fn run() {\n    std::fs::read(\"x\");\n}\npub fn load() {\n    std::fs::read(\"y\");\n}\n",
        );
        assert!(is_in_async_function(&lines, 1));
        assert!(!is_in_async_function(&lines, 4));
    }

    #[test]
    fn test_spawned_block_counts_as_async() {
        let lines = production_lines(
            "fn schedule() {\n    tokio::spawn(async move {\n        std::fs::read(\"x\");\n    });\n}\n",
        );
        assert!(is_in_async_function(&lines, 2));
    }

    #[test]
    fn test_dependency_names() {
        let manifest = "[package]\nname = \"x\"\n\n[dependencies]\n# Runtime\ntokio = \"1\"\nserde = { version = \"1\" }\n\n[dev-dependencies]\naxum = \"0.8\"\n";
        assert_eq!(dependency_names(manifest), vec!["tokio", "serde"]);
    }
}
