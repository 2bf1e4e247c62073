//! Drives the `glbuild` binary end to end.

use std::process::Command;

use camino::Utf8PathBuf;

fn glbuild() -> Command {
    Command::new(env!("CARGO_BIN_EXE_glbuild"))
}

fn demo_dir(source: &str) -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    std::fs::write(path.join("main.cpp"), source).unwrap();
    (dir, path)
}

#[test]
fn unknown_compiler_fails_and_removes_stale_artifact() {
    let (_guard, dir) = demo_dir("int main() {}\n");
    std::fs::write(dir.join("run.out"), "stale").unwrap();

    let output = glbuild()
        .args(["build", "--demo-dir", dir.as_str(), "--compiler", "glbuild-no-such-compiler"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!dir.join("run.out").exists());
}

#[test]
fn bad_config_is_reported() {
    let (_guard, dir) = demo_dir("int main() {}\n");
    std::fs::write(dir.join("glbuild.toml"), "opt-level = \"fast\"\n").unwrap();

    let output = glbuild().args(["build", "--demo-dir", dir.as_str()]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("glbuild.toml"), "{stderr}");
}

/// Writes a stand-in compiler that emits a runnable script at the `-o` path.
#[cfg(unix)]
fn write_fake_compiler(dir: &camino::Utf8Path) {
    std::fs::write(
        dir.join("fakecc.sh"),
        "while [ \"$1\" != \"-o\" ]; do shift; done\n\
         printf '#!/bin/sh\\necho ran > ran.txt\\n' > \"$2\"\nchmod +x \"$2\"\n",
    )
    .unwrap();
    std::fs::write(dir.join("glbuild.toml"), "compiler = \"sh\"\nsources = [\"fakecc.sh\"]\n")
        .unwrap();
}

#[cfg(unix)]
#[test]
fn builds_and_runs_with_configured_compiler() {
    let (_guard, dir) = demo_dir("");
    write_fake_compiler(&dir);

    let status = glbuild()
        .args(["build", "--demo-dir", dir.as_str(), "--run"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(dir.join("run.out").exists());
    assert!(dir.join("ran.txt").exists());
}

#[cfg(unix)]
#[test]
fn runs_artifact_in_directory_with_space() {
    let (_guard, root) = demo_dir("");
    let dir = root.join("my demo");
    std::fs::create_dir_all(&dir).unwrap();
    write_fake_compiler(&dir);

    let status = glbuild()
        .args(["build", "--demo-dir", dir.as_str(), "--run"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(dir.join("run.out").exists());
    assert!(dir.join("ran.txt").exists());
}
