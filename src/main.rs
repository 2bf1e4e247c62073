//! `glbuild`, the build scripts for the OpenGL demos.
//!
//! `glbuild build` compiles the demo in a directory (removing the previous
//! artifact first) and can run the result; `glbuild setup-emsdk` fetches and
//! activates the emscripten SDK needed for browser builds.

use std::process::ExitCode;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use glbuild::config::{BuildConfig, CONFIG_FILE_NAME, TomlConfig};
use glbuild::emsdk::{DEFAULT_VERSION, EMSDK_REPO_URL, EmsdkBootstrap, default_sdk_dir};
use glbuild::fs_utils::{delete_file, run_executable_in};
use glbuild::{BuildOutcome, Platform};
use log::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds the OpenGL demo programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compile a demo, replacing its previous artifact.
    Build(BuildArgs),
    /// Clone the emscripten SDK if needed and activate a toolchain.
    SetupEmsdk(EmsdkArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Directory holding the demo sources.
    #[arg(long, default_value = ".")]
    demo_dir: Utf8PathBuf,

    /// Config file; defaults to `glbuild.toml` in the demo directory.
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    #[arg(long, value_enum)]
    platform: Option<Platform>,

    #[arg(long)]
    compiler: Option<String>,

    /// Source file, relative to the demo directory. Repeatable.
    #[arg(long = "source")]
    sources: Vec<Utf8PathBuf>,

    #[arg(short = 'O', long)]
    opt_level: Option<u8>,

    /// Extra compiler flags, appended after the configured ones. Repeatable.
    #[arg(long = "flag", allow_hyphen_values = true)]
    flags: Vec<String>,

    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Run the artifact after a successful native build.
    #[arg(long)]
    run: bool,
}

#[derive(Args, Debug)]
struct EmsdkArgs {
    /// Defaults to `emsdk` next to the `glbuild` executable.
    #[arg(long)]
    sdk_dir: Option<Utf8PathBuf>,

    #[arg(long, default_value = DEFAULT_VERSION)]
    version: String,

    #[arg(long, default_value = EMSDK_REPO_URL)]
    repo_url: String,
}

fn build(args: BuildArgs) -> Result<ExitCode> {
    let demo_dir = args
        .demo_dir
        .canonicalize_utf8()
        .context(format!("Bad demo directory {}", args.demo_dir))?;
    let config_path = args.config.clone().unwrap_or_else(|| demo_dir.join(CONFIG_FILE_NAME));

    let cli = TomlConfig {
        platform: args.platform,
        compiler: args.compiler,
        sources: args.sources,
        opt_level: args.opt_level,
        flags: args.flags,
        output: args.output,
        timeout_secs: args.timeout_secs,
    };
    let file = TomlConfig::load_or_default(&config_path)?;
    let env = TomlConfig::from_env(|var| std::env::var(var).ok());
    let config = BuildConfig::resolve(&demo_dir, cli.or(file.or(env)));
    debug!("Resolved config: {config:?}");

    let artifact = config.artifact();
    delete_file(&artifact)?;

    let outcome = config.builder().build().context("Cannot run the compiler")?;
    match &outcome {
        BuildOutcome::Success { .. } if outcome.artifact_exists() => {
            info!("{}", outcome.summary());
        }
        BuildOutcome::Success { .. } => {
            anyhow::bail!("compiler reported success but `{artifact}` was not produced");
        }
        _ => {
            log::error!("{}", outcome.summary());
            return Ok(ExitCode::FAILURE);
        }
    }

    if args.run {
        if config.platform == Platform::Native {
            run_executable_in(&demo_dir, &artifact)?;
        } else {
            info!("Not running `{artifact}`, open it in a browser instead");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn setup_emsdk(args: EmsdkArgs) -> Result<ExitCode> {
    let sdk_dir = match args.sdk_dir {
        Some(dir) => dir,
        None => default_sdk_dir()?,
    };
    let mut sdk = EmsdkBootstrap::new(sdk_dir);
    sdk.version = args.version;
    sdk.repo_url = args.repo_url;
    sdk.bootstrap()?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::builder().filter_level(log_level).init();

    match cli.command {
        Cmd::Build(args) => build(args),
        Cmd::SetupEmsdk(args) => setup_emsdk(args),
    }
}
