//! Filesystem and process helpers used by the build scripts.

use std::process::{Command, ExitStatus};

use anyhow::{Context, bail};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Walks `levels` directories up from the directory containing `file`.
///
/// `levels == 0` gives the directory holding `file` itself. This only looks at
/// the path, it never touches the filesystem: once a relative path runs out
/// of named components the walk continues with `..` components.
pub fn path_traverse_up(file: impl AsRef<Utf8Path>, levels: usize) -> anyhow::Result<Utf8PathBuf> {
    let file = file.as_ref();
    let mut dir = file.to_path_buf();
    for _ in 0..=levels {
        dir = match parent_dir(&dir) {
            Some(parent) => parent,
            None => bail!("cannot walk {levels} level(s) up from `{file}`"),
        };
    }
    Ok(dir)
}

/// The lexical parent of `path`, `None` above the root.
fn parent_dir(path: &Utf8Path) -> Option<Utf8PathBuf> {
    match path.components().next_back() {
        None | Some(Utf8Component::CurDir) => Some(Utf8PathBuf::from("..")),
        Some(Utf8Component::ParentDir) => Some(path.join("..")),
        Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => None,
        Some(Utf8Component::Normal(_)) => match path.parent() {
            // `Utf8Path::parent` yields "" for a bare relative name.
            Some(parent) if parent.as_str().is_empty() => Some(Utf8PathBuf::from(".")),
            parent => parent.map(Utf8Path::to_path_buf),
        },
    }
}

pub fn file_exist(path: impl AsRef<Utf8Path>) -> bool {
    path.as_ref().is_file()
}

pub fn directory_exist(path: impl AsRef<Utf8Path>) -> bool {
    path.as_ref().is_dir()
}

/// Removes `path` if it is there. A missing file is not an error.
pub fn delete_file(path: impl AsRef<Utf8Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::debug!("Deleted `{path}`");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context(format!("Cannot remove file {path}")),
    }
}

/// Changes the working directory of the whole process.
///
/// Everything relative that runs afterwards, including child processes,
/// sees the new directory. Prefer passing a directory to
/// [`run_command_in`] or the compilation builder.
pub fn change_active_directory(path: impl AsRef<Utf8Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    log::info!("Changing directory to `{path}`");
    std::env::set_current_dir(path).context(format!("Cannot change directory to {path}"))
}

fn shell(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut shell = Command::new("cmd");
        shell.args(["/C", cmd]);
        shell
    } else {
        let mut shell = Command::new("sh");
        shell.args(["-c", cmd]);
        shell
    }
}

/// Runs `cmd` through the shell in the current directory, with the terminal's
/// stdio, and waits for it. A non-zero exit is an error.
pub fn run_command(cmd: &str) -> anyhow::Result<()> {
    run_shell(shell(cmd), cmd)
}

pub fn run_command_in(dir: impl AsRef<Utf8Path>, cmd: &str) -> anyhow::Result<()> {
    let dir = dir.as_ref();
    let mut shell = shell(cmd);
    shell.current_dir(dir);
    run_shell(shell, cmd).with_context(|| format!("in directory {dir}"))
}

/// Runs the executable at `program` directly, without a shell, from `dir`.
/// The path is passed as a single argument, so spaces need no quoting.
pub fn run_executable_in(dir: impl AsRef<Utf8Path>, program: impl AsRef<Utf8Path>) -> anyhow::Result<()> {
    let (dir, program) = (dir.as_ref(), program.as_ref());
    log::info!("Running `{program}`");
    let status = Command::new(program)
        .current_dir(dir)
        .status()
        .context(format!("Cannot launch `{program}`"))?;
    check_status(program.as_str(), status)
}

fn run_shell(mut shell: Command, cmd: &str) -> anyhow::Result<()> {
    log::info!("Executing `{cmd}`");
    let status = shell.status().context(format!("Cannot launch `{cmd}`"))?;
    check_status(cmd, status)
}

fn check_status(cmd: &str, status: ExitStatus) -> anyhow::Result<()> {
    if !status.success() {
        bail!("Command `{cmd}` failed with {status}");
    }
    Ok(())
}
