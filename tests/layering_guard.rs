//! Layering guardrails for the workspace crates.
//!
//! `eon_core` is pure vocabulary and must stay dependency-free. `eon_syntax` sits below the compiler and
//! must never depend on the `eon` crate or on its CLI stack. These tests scan the member manifests.

/// Dependency names listed in the `[dependencies]` table of `manifest`.
fn dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_vocabulary_has_no_dependencies() {
    let deps = dependencies(include_str!("../crates/eon_core/Cargo.toml"));
    assert!(deps.is_empty(), "eon_core must not have dependencies, found {:?}", deps);
}

#[test]
fn syntax_crate_stays_below_the_compiler() {
    let deps = dependencies(include_str!("../crates/eon_syntax/Cargo.toml"));
    for forbidden in ["eon", "clap", "miette"] {
        assert!(
            !deps.iter().any(|d| d == forbidden),
            "`{}` must not appear in eon_syntax [dependencies]",
            forbidden
        );
    }
    assert!(deps.iter().any(|d| d == "eon_core"));
}

#[test]
fn compiler_uses_the_shared_crates() {
    let deps = dependencies(include_str!("../Cargo.toml"));
    assert!(deps.iter().any(|d| d == "eon_core"));
    assert!(deps.iter().any(|d| d == "eon_syntax"));
}
