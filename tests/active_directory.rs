//! Changes the working directory of the test process, so this lives in its
//! own test binary with a single test.

use camino::Utf8PathBuf;
use glbuild::fs_utils::{change_active_directory, file_exist, path_traverse_up};

#[cfg(unix)]
#[test]
fn commands_follow_active_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().canonicalize().unwrap()).unwrap();
    let demo = root.join("releases").join("N1_triangle");
    std::fs::create_dir_all(&demo).unwrap();
    let script = demo.join("build.py");
    std::fs::write(&script, "").unwrap();

    let previous = std::env::current_dir().unwrap();

    change_active_directory(path_traverse_up(&script, 0).unwrap()).unwrap();
    glbuild::fs_utils::run_command("echo built > run.out").unwrap();
    assert!(file_exist(demo.join("run.out")));
    assert!(file_exist("run.out"));

    change_active_directory(path_traverse_up(&script, 1).unwrap()).unwrap();
    assert!(!file_exist("run.out"));
    assert!(file_exist("N1_triangle/run.out"));

    assert!(change_active_directory(root.join("missing")).is_err());

    std::env::set_current_dir(previous).unwrap();
}
