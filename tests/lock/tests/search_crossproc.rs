//! Cross-process determinism of scripted searches.
//!
//! Spawns the `search_fixture` binary under several environment variants
//! and asserts identical stdout. Search results must not depend on cwd,
//! locale, log level or unrelated environment variables.

use std::path::Path;
use std::process::Command;

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// Run the fixture with the given cwd and environment overrides and return
/// its stdout.
fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = env!("CARGO_BIN_EXE_search_fixture");
    let mut command = Command::new(bin);
    command
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "search_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_four_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);
    assert!(
        baseline.contains("tree_digest=sha256:"),
        "baseline output missing tree_digest"
    );
    assert!(
        baseline.contains("result_digest=sha256:"),
        "baseline output missing result_digest"
    );

    let alt_cwd = if cfg!(target_os = "windows") { "C:\\" } else { "/tmp" };
    assert_eq!(
        baseline,
        run_variant(alt_cwd, &[]),
        "output differs when cwd changes from {root} to {alt_cwd}"
    );

    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs when LC_ALL=C LANG=C"
    );

    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[
                ("THICKET_NOISE", "should_not_matter"),
                ("TZ", "America/New_York"),
                ("RUST_LOG", "debug"),
            ],
        ),
        "output differs with spurious env vars (THICKET_NOISE, TZ, RUST_LOG)"
    );
}

#[test]
fn crossproc_output_reports_solved_runs() {
    let output = run_variant(&workspace_root(), &[]);
    for method in ["bfs", "dfs", "beam"] {
        assert!(
            output.contains(&format!("method={method}\n")),
            "missing block for {method}"
        );
    }
    assert_eq!(
        output
            .lines()
            .filter(|l| *l == "final_answer=25 - 1 = 24 (left: 24)")
            .count(),
        3,
        "every method should reach 24:\n{output}"
    );
    assert_eq!(
        output.lines().filter(|l| l.starts_with("termination=Solved")).count(),
        3
    );
}
