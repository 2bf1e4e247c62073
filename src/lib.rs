//! Build tooling for the OpenGL demo programs.
//!
//! The demos are plain C++ sources compiled by an external compiler: `g++` for
//! the native desktop build, `em++` from the emscripten SDK for the browser
//! build. This crate assembles those compiler invocations, runs them, and
//! provides the small set of filesystem and process helpers the build scripts
//! need, plus a bootstrap for the emscripten SDK itself.

pub mod compile;
pub mod config;
pub mod emsdk;
pub mod exec;
pub mod fs_utils;
pub mod platform;

pub use compile::{BuildOutcome, CompilationCommandBuilder, InvocationError, RenderedCommand};
pub use platform::Platform;
