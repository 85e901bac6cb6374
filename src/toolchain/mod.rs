//! Build tool and compiler discovery.
//!
//! [`ToolPaths`] is probed once per process and can be refreshed on demand.
//! Command construction only reads it.

pub mod discovery;
pub mod env;

pub use env::{EnvSetupError, resolve_compiler_environment};

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{BuildSelection, BuildSystem, Toolchain};

/// Locations of the external programs a build may need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPaths {
    pub cmake: Option<PathBuf>,
    pub ninja: Option<PathBuf>,
    pub cl: Option<PathBuf>,
    pub vcvarsall: Option<PathBuf>,
    pub clang_cl: Option<PathBuf>,
    pub clangxx: Option<PathBuf>,
    pub gcc: Option<PathBuf>,
    pub gpp: Option<PathBuf>,
    /// Release year of the Visual Studio install `cl` came from.
    pub visual_studio: Option<String>,
}

impl ToolPaths {
    /// Probes known install locations and `PATH`.
    pub fn detect() -> Self {
        let mut tools = ToolPaths {
            cmake: discovery::find_cmake(),
            ninja: discovery::find_ninja(),
            ..ToolPaths::default()
        };

        if let Some(vs) = discovery::find_visual_studio() {
            tools.cl = Some(vs.cl);
            tools.vcvarsall = Some(vs.vcvarsall);
            tools.visual_studio = Some(vs.year);
        }

        let (clang_cl, clangxx) = discovery::find_llvm();
        tools.clang_cl = clang_cl;
        tools.clangxx = clangxx;

        if let Some((gcc, gpp)) = discovery::find_mingw() {
            tools.gcc = Some(gcc);
            tools.gpp = Some(gpp);
        }

        info!(
            cmake = tools.cmake.is_some(),
            ninja = tools.ninja.is_some(),
            msvc = tools.cl.is_some(),
            clang_cl = tools.clang_cl.is_some(),
            mingw = tools.gcc.is_some(),
            "tool probe finished"
        );
        tools
    }

    /// Name and location of every tool, in display order.
    pub fn entries(&self) -> Vec<(&'static str, Option<&Path>)> {
        vec![
            ("CMake", self.cmake.as_deref()),
            ("Ninja", self.ninja.as_deref()),
            ("MSVC (cl)", self.cl.as_deref()),
            ("vcvarsall.bat", self.vcvarsall.as_deref()),
            ("clang-cl", self.clang_cl.as_deref()),
            ("clang++", self.clangxx.as_deref()),
            ("gcc", self.gcc.as_deref()),
            ("g++", self.gpp.as_deref()),
        ]
    }

    /// Tools the selection needs that were not found.
    pub fn missing_for(&self, sel: &BuildSelection) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.cmake.is_none() {
            missing.push("CMake");
        }
        if sel.build_system == BuildSystem::Ninja && self.ninja.is_none() {
            missing.push("Ninja");
        }
        match sel.toolchain {
            Toolchain::MSVC if self.cl.is_none() => missing.push("MSVC (cl)"),
            Toolchain::ClangCL if self.clang_cl.is_none() => missing.push("clang-cl"),
            Toolchain::MinGW if self.gcc.is_none() || self.gpp.is_none() => {
                missing.push("MinGW (gcc/g++)")
            }
            _ => {}
        }
        missing
    }
}
