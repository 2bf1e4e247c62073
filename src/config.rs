//! Per-demo build configuration.
//!
//! A demo directory may carry a `glbuild.toml`:
//!
//! ```toml
//! platform = "native"
//! compiler = "clang++"
//! sources = ["main.cpp", "layout.cpp"]
//! opt-level = 2
//! flags = ["-std=c++17"]
//! output = "run.out"
//! timeout-secs = 300
//! ```
//!
//! Every key is optional. Values are resolved as command line, then file,
//! then environment (`CXX`, `CXXFLAGS`), then the platform defaults.

use std::time::Duration;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::compile::CompilationCommandBuilder;
use crate::fs_utils::file_exist;
use crate::platform::{Platform, add_opengl_compiler_settings};

pub const CONFIG_FILE_NAME: &str = "glbuild.toml";

/// Contents of a `glbuild.toml`, or the equivalent command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct TomlConfig {
    pub platform: Option<Platform>,
    pub compiler: Option<String>,
    #[serde(default)]
    pub sources: Vec<Utf8PathBuf>,
    pub opt_level: Option<u8>,
    #[serde(default)]
    pub flags: Vec<String>,
    pub output: Option<Utf8PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl TomlConfig {
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads `path`, or returns the empty config if there is no such file.
    pub fn load_or_default(path: &Utf8Path) -> anyhow::Result<Self> {
        if !file_exist(path) {
            log::debug!("No config at `{path}`, using defaults");
            return Ok(Self::default());
        }
        let contents =
            std::fs::read_to_string(path).context(format!("Cannot read config {path}"))?;
        Self::parse(&contents).context(format!("Invalid config {path}"))
    }

    /// Layers `self` on top of `lower`: set values in `self` win, flags are
    /// appended after the ones of `lower`.
    pub fn or(self, lower: TomlConfig) -> TomlConfig {
        let mut flags = lower.flags;
        flags.extend(self.flags);
        TomlConfig {
            platform: self.platform.or(lower.platform),
            compiler: self.compiler.or(lower.compiler),
            sources: if self.sources.is_empty() { lower.sources } else { self.sources },
            opt_level: self.opt_level.or(lower.opt_level),
            flags,
            output: self.output.or(lower.output),
            timeout_secs: self.timeout_secs.or(lower.timeout_secs),
        }
    }

    /// Configuration taken from the compiler environment variables.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> TomlConfig {
        let compiler = lookup("CXX").filter(|cxx| !cxx.trim().is_empty());
        let flags = lookup("CXXFLAGS")
            .map(|flags| flags.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
        TomlConfig { compiler, flags, ..TomlConfig::default() }
    }
}

/// Fully resolved settings for one demo build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub demo_dir: Utf8PathBuf,
    pub platform: Platform,
    pub compiler: String,
    pub sources: Vec<Utf8PathBuf>,
    pub opt_level: Option<u8>,
    pub flags: Vec<String>,
    pub output: Utf8PathBuf,
    pub timeout: Option<Duration>,
}

impl BuildConfig {
    pub fn resolve(demo_dir: &Utf8Path, toml: TomlConfig) -> BuildConfig {
        let platform = toml.platform.unwrap_or_default();
        BuildConfig {
            demo_dir: demo_dir.to_path_buf(),
            platform,
            compiler: toml.compiler.unwrap_or_else(|| platform.default_compiler().to_string()),
            sources: if toml.sources.is_empty() {
                vec![Utf8PathBuf::from("main.cpp")]
            } else {
                toml.sources
            },
            opt_level: toml.opt_level,
            flags: toml.flags,
            output: toml.output.unwrap_or_else(|| platform.default_output().into()),
            timeout: toml.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Path of the artifact on disk.
    pub fn artifact(&self) -> Utf8PathBuf {
        self.demo_dir.join(&self.output)
    }

    /// The compiler invocation for this demo, run from inside the demo
    /// directory.
    pub fn builder(&self) -> CompilationCommandBuilder {
        let mut builder = CompilationCommandBuilder::new();
        builder.set_compiler(&self.compiler).set_current_dir(&self.demo_dir);
        for source in &self.sources {
            builder.add_source_file(source);
        }
        if let Some(level) = self.opt_level {
            builder.set_optimization_level(level);
        }
        add_opengl_compiler_settings(&mut builder, self.platform);
        builder.add_flags(self.flags.iter().map(String::as_str));
        builder.set_output_file(&self.output);
        if let Some(timeout) = self.timeout {
            builder.set_timeout(timeout);
        }
        builder
    }
}
