//! Fetching and activating the emscripten SDK.
//!
//! The SDK is cloned once into a directory next to the tool and then asked to
//! install and activate a toolchain version. Nothing here is transactional:
//! if a step fails the directory is left as the failing tool left it.

use std::process::Command;

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};

use crate::fs_utils::{directory_exist, file_exist, run_command_in};

pub const EMSDK_REPO_URL: &str = "https://github.com/emscripten-core/emsdk";
pub const DEFAULT_VERSION: &str = "latest";

/// `emsdk` next to the running executable.
pub fn default_sdk_dir() -> anyhow::Result<Utf8PathBuf> {
    let exe = std::env::current_exe().context("Cannot locate the running executable")?;
    let exe = Utf8PathBuf::from_path_buf(exe)
        .map_err(|p| anyhow::anyhow!("executable path {} is not UTF-8", p.display()))?;
    match exe.parent() {
        Some(tool_dir) => Ok(tool_dir.join("emsdk")),
        None => bail!("executable path `{exe}` has no parent directory"),
    }
}

#[derive(Debug, Clone)]
pub struct EmsdkBootstrap {
    pub repo_url: String,
    pub sdk_dir: Utf8PathBuf,
    pub version: String,
}

impl EmsdkBootstrap {
    pub fn new(sdk_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            repo_url: EMSDK_REPO_URL.to_string(),
            sdk_dir: sdk_dir.into(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    /// The `emsdk` driver script inside the checkout. Its presence is taken
    /// to mean the clone already happened.
    pub fn marker(&self) -> Utf8PathBuf {
        self.sdk_dir.join("emsdk")
    }

    pub fn is_downloaded(&self) -> bool {
        file_exist(self.marker())
    }

    /// `em++` of the activated toolchain.
    pub fn compiler_path(&self) -> Utf8PathBuf {
        self.sdk_dir.join("upstream").join("emscripten").join("em++")
    }

    /// Clones the SDK unless it is already there. Returns whether a clone
    /// happened.
    pub fn download(&self) -> anyhow::Result<bool> {
        if self.is_downloaded() {
            log::info!("emscripten directory already exists at `{}`", self.sdk_dir);
            return Ok(false);
        }
        if directory_exist(&self.sdk_dir) {
            bail!(
                "`{}` exists but has no `emsdk` script; remove it to clone the SDK again",
                self.sdk_dir
            );
        }

        log::info!("Downloading emscripten from {} into `{}`", self.repo_url, self.sdk_dir);
        git_clone(&self.repo_url, &self.sdk_dir)?;
        Ok(true)
    }

    /// Installs and activates the configured toolchain version.
    pub fn setup(&self) -> anyhow::Result<()> {
        if !self.is_downloaded() {
            bail!("emscripten SDK not found at `{}`", self.sdk_dir);
        }
        run_command_in(&self.sdk_dir, &format!("./emsdk install {}", self.version))?;
        run_command_in(&self.sdk_dir, &format!("./emsdk activate {}", self.version))?;
        log::info!("emscripten {} active, compiler at `{}`", self.version, self.compiler_path());
        Ok(())
    }

    pub fn bootstrap(&self) -> anyhow::Result<()> {
        self.download()?;
        self.setup()
    }
}

fn git_clone(url: &str, dir: &Utf8Path) -> anyhow::Result<()> {
    let status = Command::new("git")
        .args(["clone", url])
        .arg(dir)
        .status()
        .context("Cannot launch `git`, is it installed?")?;
    if !status.success() {
        bail!("`git clone {url} {dir}` failed with {status}");
    }
    Ok(())
}
