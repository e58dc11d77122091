//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code in the core crate MUST NOT use blocking I/O.
//! **Required**: `tokio::fs`, `tokio::process`, async `reqwest`.
//!
//! Blocking calls in plain functions are acceptable: configuration is read
//! once, before the conversation starts.

use std::path::Path;

use architectural_enforcement::{is_in_async_function, production_lines_of, rust_files};

#[test]
fn test_no_blocking_io_in_core() {
    let mut violations = Vec::new();

    for path in rust_files("assistant/core/src") {
        check_file(&path, &mut violations);
    }

    if !violations.is_empty() {
        eprintln!("\n❌ Blocking I/O calls found in async code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n❌ FORBIDDEN blocking I/O:");
        eprintln!("  - std::fs::*, std::net::*");
        eprintln!("  - std::process::Command");
        eprintln!("  - reqwest::blocking::*");
        eprintln!("  - std::io::stdin() / std::io::stdout()");
        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::fs::write().await");
        eprintln!("  - tokio::process::Command::status().await");

        panic!("\nFound {} blocking I/O violation(s).", violations.len());
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>) {
    let lines = production_lines_of(path);

    for (idx, line) in lines.iter().enumerate() {
        let code = &line.code;

        // These never belong in the core, sync or not
        let always = code.contains("reqwest::blocking")
            || code.contains("std::io::stdin()")
            || code.contains("std::io::stdout()");

        let blocking = code.contains("std::fs::")
            || code.contains("std::net::")
            || code.contains("std::process::Command");

        if always || (blocking && is_in_async_function(&lines, idx)) {
            violations.push(format!(
                "{}:{} - {}",
                path.display(),
                line.number,
                code.trim()
            ));
        }
    }
}

#[test]
fn test_no_console_output_in_core() {
    let mut violations = Vec::new();

    for path in rust_files("assistant/core/src") {
        for line in production_lines_of(&path) {
            if line.code.contains("println!(") || line.code.contains("print!(") {
                violations.push(format!("{}:{}", path.display(), line.number));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "core must log through tracing, not the console: {violations:?}"
    );
}
