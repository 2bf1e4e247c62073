//! Building a single compiler invocation from its parts.
//!
//! A [`CompilationCommandBuilder`] collects the compiler, the source files,
//! the optimization level, free-form flags and the output path, and renders
//! them in a fixed order:
//!
//! ```text
//! <compiler> <sources...> [-O<level>] [flags...] -o <output>
//! ```
//!
//! Sources keep their insertion order since it is also the link order.

use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};

use crate::exec::run_captured;
use crate::fs_utils::file_exist;

/// The builder was asked to render before it had everything it needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("no compiler was set")]
    MissingCompiler,
    #[error("no source files were added")]
    NoSourceFiles,
    #[error("no output file was set")]
    MissingOutput,
}

#[derive(Debug, Clone, Default)]
pub struct CompilationCommandBuilder {
    compiler: Option<String>,
    source_files: Vec<Utf8PathBuf>,
    optimization: Option<u8>,
    extra_flags: Vec<String>,
    output: Option<Utf8PathBuf>,
    current_dir: Option<Utf8PathBuf>,
    timeout: Option<Duration>,
}

impl CompilationCommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the compiler executable. Whether it exists is only found out
    /// when the build is launched.
    pub fn set_compiler(&mut self, compiler: &str) -> &mut Self {
        self.compiler = Some(compiler.to_string());
        self
    }

    pub fn add_source_file(&mut self, path: impl AsRef<Utf8Path>) -> &mut Self {
        self.source_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Renders as `-O<level>`. Unset means an unoptimized build.
    pub fn set_optimization_level(&mut self, level: u8) -> &mut Self {
        self.optimization = Some(level);
        self
    }

    /// Appends a flag string as given. A string holding several flags
    /// (`"-w -lSDL2"`) is split on whitespace, the way a shell would split it;
    /// nothing is quoted or escaped.
    pub fn add_flag(&mut self, flag: &str) -> &mut Self {
        self.extra_flags.push(flag.to_string());
        self
    }

    pub fn add_flags<'a>(&mut self, flags: impl IntoIterator<Item = &'a str>) -> &mut Self {
        self.extra_flags.extend(flags.into_iter().map(|s| s.to_owned()));
        self
    }

    pub fn set_output_file(&mut self, path: impl AsRef<Utf8Path>) -> &mut Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Working directory of the compiler process. Relative source and output
    /// paths are resolved against it. Defaults to the current directory.
    pub fn set_current_dir(&mut self, dir: impl AsRef<Utf8Path>) -> &mut Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Kill the compiler if it runs longer than `timeout`.
    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    /// Where the artifact lands, taking the working directory into account.
    pub fn artifact_path(&self) -> Option<Utf8PathBuf> {
        let output = self.output.as_deref()?;
        Some(match &self.current_dir {
            Some(dir) if output.is_relative() => dir.join(output),
            _ => output.to_path_buf(),
        })
    }

    pub fn render(&self) -> Result<RenderedCommand, InvocationError> {
        let compiler = self.compiler.as_ref().ok_or(InvocationError::MissingCompiler)?;
        if self.source_files.is_empty() {
            return Err(InvocationError::NoSourceFiles);
        }
        let output = self.output.as_ref().ok_or(InvocationError::MissingOutput)?;

        let mut args: Vec<String> = self.source_files.iter().map(|p| p.to_string()).collect();
        if let Some(level) = self.optimization {
            args.push(format!("-O{level}"));
        }
        for flag in &self.extra_flags {
            args.extend(flag.split_whitespace().map(str::to_owned));
        }
        args.push("-o".to_string());
        args.push(output.to_string());

        Ok(RenderedCommand { program: compiler.clone(), args })
    }

    fn command(&self, rendered: &RenderedCommand) -> Command {
        let mut cmd = rendered.to_command();
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Renders the invocation, runs it and waits for it to finish.
    ///
    /// Compiler diagnostics are echoed to stderr as well as returned in the
    /// outcome. Only failures to launch the compiler for reasons other than
    /// it not existing are returned as `Err`.
    pub fn build(&self) -> io::Result<BuildOutcome> {
        let rendered = self.render().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if let Some(dir) = self.current_dir.as_deref().filter(|dir| !dir.is_dir()) {
            // Spawning would fail with `NotFound`, indistinguishable from a missing compiler.
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("working directory `{dir}` does not exist"),
            ));
        }
        log::info!("Running `{rendered}`");

        let output = match run_captured(&mut self.command(&rendered), self.timeout) {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::error!("compiler `{}` not found", rendered.program);
                return Ok(BuildOutcome::CompilerNotFound { compiler: rendered.program });
            }
            Err(e) => return Err(e),
        };

        let stdout = output.stdout_utf8();
        let stderr = output.stderr_utf8();
        if !stdout.is_empty() {
            print!("{stdout}");
        }
        if !stderr.is_empty() {
            eprint!("{stderr}");
        }

        let outcome = match output.status {
            None => BuildOutcome::TimedOut { after: output.elapsed },
            Some(status) if status.success() => {
                // `artifact_path` is only `None` without an output, which `render` rejects.
                let artifact = self.artifact_path().unwrap_or_default();
                BuildOutcome::Success { artifact }
            }
            Some(status) => BuildOutcome::CompileError { status, diagnostics: stdout + &stderr },
        };
        log::debug!("build finished in {:?}: {}", output.elapsed, outcome.summary());
        Ok(outcome)
    }
}

/// A compiler invocation ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RenderedCommand {
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum BuildOutcome {
    Success { artifact: Utf8PathBuf },
    CompilerNotFound { compiler: String },
    CompileError { status: ExitStatus, diagnostics: String },
    TimedOut { after: Duration },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success { .. })
    }

    /// Whether the compiler claims success *and* the artifact is on disk.
    pub fn artifact_exists(&self) -> bool {
        match self {
            BuildOutcome::Success { artifact } => file_exist(artifact),
            _ => false,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            BuildOutcome::Success { artifact } => format!("built {artifact}"),
            BuildOutcome::CompilerNotFound { compiler } => format!("compiler `{compiler}` not found"),
            BuildOutcome::CompileError { status, .. } => format!("compilation failed ({status})"),
            BuildOutcome::TimedOut { after } => format!("compiler timed out after {after:?}"),
        }
    }
}
