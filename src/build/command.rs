//! CMake command lines for the current context.
//!
//! Everything here is a pure function of [`BuildContext`]: nothing is spawned
//! and the only filesystem access is checking whether a toolchain file exists.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::config::{BuildSystem, Platform, Toolchain};
use crate::context::BuildContext;

/// A program and its arguments, unquoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Any argument starting with `prefix`, e.g. `-DCMAKE_CXX_COMPILER=`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.args.iter().any(|a| a.starts_with(prefix))
    }

    /// The argument following `flag`.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// The part after `prefix` of the first argument that has it.
    pub fn define(&self, prefix: &str) -> Option<&str> {
        self.args.iter().find_map(|a| a.strip_prefix(prefix))
    }

    pub fn program_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

fn quote(text: &str) -> String {
    if text.is_empty() || text.contains([' ', '\t']) {
        format!("\"{}\"", text)
    } else {
        text.to_string()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Toolchain file passed to CMake, if any.
///
/// MinGW with both compilers known passes them directly instead.
fn toolchain_file_for(ctx: &BuildContext) -> Option<PathBuf> {
    let sel = &ctx.selection;
    if sel.toolchain == Toolchain::MinGW && ctx.tools.gcc.is_some() && ctx.tools.gpp.is_some() {
        return None;
    }
    Some(ctx.layout.toolchain_file(sel.toolchain)).filter(|f| f.exists())
}

fn push_compilers(cmd: &mut CommandLine, cxx: &Path, c: &Path) {
    cmd.arg(format!("-DCMAKE_CXX_COMPILER={}", path_arg(cxx)));
    cmd.arg(format!("-DCMAKE_C_COMPILER={}", path_arg(c)));
}

/// `cmake -S <root> -B <folder> -G <generator> ...`, or `None` without CMake.
pub fn generate_command(ctx: &BuildContext) -> Option<CommandLine> {
    let cmake = ctx.tools.cmake.as_ref()?;
    let sel = &ctx.selection;
    let tools = &ctx.tools;

    let mut cmd = CommandLine::new(cmake);
    cmd.arg("-S")
        .arg(path_arg(ctx.layout.root()))
        .arg("-B")
        .arg(sel.build_folder_name())
        .arg("-G")
        .arg(sel.cmake_generator())
        .arg(format!("-DCMAKE_BUILD_TYPE={}", sel.configuration.cmake_name()));

    if sel.build_system == BuildSystem::Ninja {
        let toolchain_file = toolchain_file_for(ctx);
        if let Some(file) = &toolchain_file {
            cmd.arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", path_arg(file)));
        }
        if let Some(ninja) = &tools.ninja {
            cmd.arg(format!("-DCMAKE_MAKE_PROGRAM={}", path_arg(ninja)));
        }
        cmd.arg(format!("-DPROJECT_NAME={}", sel.project_name));
        cmd.arg(format!("-DPROJECT_CXX_STANDARD={}", sel.cxx_standard));
        cmd.arg(format!("-DCMAKE_MINIMUM_REQUIRED={}", sel.cmake_minimum_version));

        match sel.toolchain {
            Toolchain::MSVC => {
                if toolchain_file.is_none()
                    && let Some(cl) = &tools.cl
                {
                    push_compilers(&mut cmd, cl, cl);
                }
            }
            Toolchain::ClangCL => {
                if toolchain_file.is_none()
                    && let Some(clang_cl) = &tools.clang_cl
                {
                    push_compilers(&mut cmd, clang_cl, clang_cl);
                }
                cmd.arg("-T").arg("clangcl");
            }
            Toolchain::MinGW => {
                if let (Some(gcc), Some(gpp)) = (&tools.gcc, &tools.gpp) {
                    push_compilers(&mut cmd, gpp, gcc);
                }
                cmd.arg("-DCMAKE_SYSTEM_NAME=Windows");
            }
        }
    }

    if sel.build_system == BuildSystem::MSBuild && sel.platform != Platform::X64 {
        cmd.arg("-A").arg(sel.platform.cmake_arch());
    }

    cmd.args(ctx.options.extra_cmake_flags.iter().cloned());

    debug!(command = %cmd, "generate command");
    Some(cmd)
}

/// `cmake --build <folder> --config <cfg> ...`, or `None` without CMake.
pub fn compile_command(ctx: &BuildContext) -> Option<CommandLine> {
    let cmake = ctx.tools.cmake.as_ref()?;
    let sel = &ctx.selection;

    let mut cmd = CommandLine::new(cmake);
    cmd.arg("--build")
        .arg(sel.build_folder_name())
        .arg("--config")
        .arg(sel.configuration.cmake_name());
    if sel.clean_first {
        cmd.arg("--clean-first");
    }
    if sel.verbose {
        cmd.arg("--verbose");
    }
    cmd.arg("-j").arg(ctx.options.jobs.to_string());

    debug!(command = %cmd, "compile command");
    Some(cmd)
}
