//! Architecture enforcement tests.
//!
//! Each external concern lives behind exactly one module. These tests scan
//! the source tree so a violation fails CI instead of creeping in.
//!
//! # Test Categories
//!
//! 1. **Boundary Imports** - `git2` only in `git`, `serde_yaml` only in `gates`
//! 2. **Process Spawning** - Only `git` spawns child processes
//! 3. **Working Directory** - Nothing changes the process working directory
//! 4. **Panics** - Non-test code propagates errors instead of unwrapping

use std::fs;
use std::path::{Path, PathBuf};

/// Every `.rs` file under `dir`, recursively.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).expect("Failed to read source directory") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    files
}

/// Source lines before the first `#[cfg(test)]`, without comment lines.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let content =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

/// Collect `file:line: text` for production lines containing `needle`
/// in files outside `allowed`.
fn violations(needle: &str, allowed: &[&str]) -> Vec<String> {
    rust_files(Path::new("src"))
        .into_iter()
        .filter(|path| {
            let normalized = path.to_string_lossy().replace('\\', "/");
            !allowed.iter().any(|prefix| normalized.starts_with(prefix))
        })
        .flat_map(|path| {
            production_lines(&path)
                .into_iter()
                .filter(|(_, line)| line.contains(needle))
                .map(move |(n, line)| format!("{}:{}: {}", path.display(), n, line.trim()))
        })
        .collect()
}

fn assert_clean(found: Vec<String>, rule: &str) {
    assert!(
        found.is_empty(),
        "{}:\n  {}",
        rule,
        found.join("\n  ")
    );
}

// =============================================================================
// Boundary Imports
// =============================================================================

#[test]
fn only_git_module_uses_git2() {
    assert_clean(
        violations("git2::", &["src/git/"]),
        "git2 used outside src/git",
    );
}

#[test]
fn only_gates_module_uses_serde_yaml() {
    assert_clean(
        violations("serde_yaml", &["src/gates/"]),
        "serde_yaml used outside src/gates",
    );
}

// =============================================================================
// Process Spawning
// =============================================================================

#[test]
fn only_git_module_spawns_processes() {
    assert_clean(
        violations("Command::new", &["src/git/"]),
        "child process spawned outside src/git",
    );
}

// =============================================================================
// Working Directory
// =============================================================================

/// Commands receive their directory through `current_dir` on the child.
#[test]
fn nothing_changes_process_working_directory() {
    assert_clean(
        violations("set_current_dir", &[]),
        "process working directory changed",
    );
}

// =============================================================================
// Panics
// =============================================================================

#[test]
fn production_code_does_not_unwrap() {
    let mut found = violations(".unwrap()", &[]);
    found.extend(violations(".expect(", &[]));
    assert_clean(found, "unwrap/expect in non-test code");
}
