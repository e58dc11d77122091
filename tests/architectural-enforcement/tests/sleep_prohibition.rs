//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code never blocks a thread with `std::thread::sleep`.
//! Async timers are only allowed in the task scheduler, which is where the
//! delayed side effects of a turn (completion flag, automatic download) live.
//! Everything else waits on I/O or channels.

use std::path::Path;

use architectural_enforcement::{production_lines_of, rust_files};

/// Files allowed to use async timers
const TIMER_ALLOWLIST: &[&str] = &["assistant/core/src/scheduler.rs"];

#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();

    for dir in ["assistant/core/src", "assistant/cli/src"] {
        for path in rust_files(dir) {
            check_file(&path, &mut violations);
        }
    }

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - tokio::time::sleep inside the TaskScheduler (delayed effects)");
        eprintln!("  - Test code (#[cfg(test)] modules, tests/ directories)");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - std::thread::sleep anywhere");
        eprintln!("  - Sleeping to wait for a reply (await the channel instead)");

        panic!("\nFound {} sleep violation(s) in production code.", violations.len());
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>) {
    let timers_allowed = TIMER_ALLOWLIST.iter().any(|allowed| path.ends_with(allowed));

    for line in production_lines_of(path) {
        let code = &line.code;

        if code.contains("thread::sleep") {
            violations.push(format!(
                "{}:{} - Thread sleep: {}",
                path.display(),
                line.number,
                code.trim()
            ));
            continue;
        }

        if (code.contains("::sleep(") || code.contains(".sleep(")) && !timers_allowed {
            violations.push(format!(
                "{}:{} - Timer outside the scheduler: {}",
                path.display(),
                line.number,
                code.trim()
            ));
        }
    }
}

#[test]
fn test_scheduler_is_the_only_timer() {
    let scheduler = architectural_enforcement::workspace_root().join(TIMER_ALLOWLIST[0]);
    let lines = production_lines_of(&scheduler);
    assert!(
        lines.iter().any(|l| l.code.contains("tokio::time::sleep")),
        "TaskScheduler should own the delayed-effect timer"
    );
}
