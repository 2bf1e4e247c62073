//! OpenGL compiler settings for the platforms the demos build for.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::compile::CompilationCommandBuilder;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// Desktop build with `g++`, SDL2 and desktop OpenGL.
    #[default]
    Native,
    /// Browser build with emscripten's `em++`, SDL2 port and OpenGL ES 2.
    Browser,
}

impl Platform {
    pub fn default_compiler(self) -> &'static str {
        match self {
            Platform::Native => "g++",
            Platform::Browser => "em++",
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            Platform::Native => "run.out",
            Platform::Browser => "run.html",
        }
    }

    pub fn opengl_flags(self) -> &'static [&'static str] {
        match self {
            Platform::Native => &["-w -lSDL2", "-w -lGL"],
            Platform::Browser => &["-s USE_SDL=2", "-s FULL_ES2=1", "-s ALLOW_MEMORY_GROWTH=1"],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Native => "native",
            Platform::Browser => "browser",
        })
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Platform::Native),
            "browser" => Ok(Platform::Browser),
            _ => Err(format!("unknown platform `{s}`, expected `native` or `browser`")),
        }
    }
}

/// Adds the link flags an OpenGL demo needs on `platform`.
pub fn add_opengl_compiler_settings(builder: &mut CompilationCommandBuilder, platform: Platform) {
    builder.add_flags(platform.opengl_flags().iter().copied());
}
