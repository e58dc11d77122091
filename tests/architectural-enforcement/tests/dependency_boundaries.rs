//! Integration Test: Dependency Boundaries
//!
//! The core crate is a headless library. Terminal rendering, argument parsing
//! and subscriber setup belong to the binary.

use std::fs;

use architectural_enforcement::{dependency_names, workspace_root};

/// Crates only a surface may depend on
const SURFACE_ONLY: &[&str] = &[
    "ratatui",
    "crossterm",
    "clap",
    "tracing-subscriber",
    "anyhow",
];

fn manifest(path: &str) -> String {
    fs::read_to_string(workspace_root().join(path))
        .unwrap_or_else(|e| panic!("cannot read {path}: {e}"))
}

#[test]
fn test_core_has_no_surface_dependencies() {
    let deps = dependency_names(&manifest("assistant/core/Cargo.toml"));
    assert!(!deps.is_empty(), "core manifest has no [dependencies]");

    let offending: Vec<_> = deps
        .iter()
        .filter(|d| SURFACE_ONLY.contains(&d.as_str()))
        .collect();
    assert!(
        offending.is_empty(),
        "core depends on surface-only crates: {offending:?}"
    );
}

#[test]
fn test_cli_goes_through_core() {
    let deps = dependency_names(&manifest("assistant/cli/Cargo.toml"));
    assert!(deps.iter().any(|d| d == "hive-assistant-core"));
    // The binary talks to the backend only via the controller
    assert!(!deps.iter().any(|d| d == "reqwest"));
}
