//! Builds real programs with the host `g++`. Skipped when it is not installed.

use std::process::Command;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use glbuild::fs_utils::{delete_file, file_exist};
use glbuild::{BuildOutcome, CompilationCommandBuilder};

const VALID_PROGRAM: &str = "int main() { return 0; }\n";
const INVALID_PROGRAM: &str = "int main() { return 0 }\n";

fn have_gxx() -> bool {
    let found = Command::new("g++").arg("--version").output().is_ok_and(|o| o.status.success());
    if !found {
        eprintln!("g++ not available, skipping");
    }
    found
}

fn demo_dir(source: &str) -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    std::fs::write(path.join("main.cpp"), source).unwrap();
    (dir, path)
}

fn gxx_builder(dir: &Utf8Path) -> CompilationCommandBuilder {
    let mut builder = CompilationCommandBuilder::new();
    builder
        .set_compiler("g++")
        .set_current_dir(dir)
        .add_source_file("main.cpp")
        .set_output_file("run.out");
    builder
}

#[test]
fn valid_program_produces_runnable_artifact() {
    if !have_gxx() {
        return;
    }
    let (_guard, dir) = demo_dir(VALID_PROGRAM);
    let artifact = dir.join("run.out");

    let outcome = gxx_builder(&dir).build().unwrap();
    assert!(outcome.is_success(), "{}", outcome.summary());
    assert!(outcome.artifact_exists());
    assert!(file_exist(&artifact));

    let status = Command::new(&artifact).status().unwrap();
    assert!(status.success());
}

#[test]
fn optimized_build_also_succeeds() {
    if !have_gxx() {
        return;
    }
    let (_guard, dir) = demo_dir(VALID_PROGRAM);
    let mut builder = gxx_builder(&dir);
    builder.set_optimization_level(2).add_flag("-Wall -Wextra");
    assert!(builder.build().unwrap().artifact_exists());
}

#[test]
fn syntax_error_leaves_no_artifact() {
    if !have_gxx() {
        return;
    }
    let (_guard, dir) = demo_dir(INVALID_PROGRAM);
    let artifact = dir.join("run.out");
    delete_file(&artifact).unwrap();

    let outcome = gxx_builder(&dir).build().unwrap();
    match &outcome {
        BuildOutcome::CompileError { status, diagnostics } => {
            assert!(!status.success());
            assert!(diagnostics.contains("main.cpp"), "{diagnostics}");
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
    assert!(!file_exist(&artifact));
}

#[cfg(unix)]
#[test]
fn slow_compiler_times_out() {
    let (_guard, dir) = demo_dir("");
    // `sh script -o run.out` stands in for a compiler that hangs.
    std::fs::write(dir.join("hang.sh"), "exec sleep 10\n").unwrap();
    let mut builder = CompilationCommandBuilder::new();
    builder
        .set_compiler("sh")
        .set_current_dir(&dir)
        .add_source_file("hang.sh")
        .set_output_file("run.out")
        .set_timeout(Duration::from_millis(200));

    let outcome = builder.build().unwrap();
    assert!(matches!(outcome, BuildOutcome::TimedOut { .. }), "{outcome:?}");
    assert!(!file_exist(dir.join("run.out")));
}
