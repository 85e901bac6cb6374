//! Generate, build, rebuild and run.

use colored::*;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::clean::clean;
use super::command::{CommandLine, compile_command, generate_command};
use super::error::ActionError;
use super::exec::run_command;
use crate::config::{BuildSystem, Ide};
use crate::context::BuildContext;
use crate::toolchain::resolve_compiler_environment;
use crate::ui;

/// The `vcvarsall.bat` environment when Ninja drives an MSVC-style compiler.
fn compiler_environment(ctx: &BuildContext) -> Option<HashMap<String, String>> {
    let sel = &ctx.selection;
    if sel.build_system != BuildSystem::Ninja
        || !sel.toolchain.uses_msvc_environment()
        || ctx.tools.vcvarsall.is_none()
    {
        return None;
    }
    println!("{} Setting up MSVC environment...", "→".blue());
    Some(resolve_compiler_environment(sel, &ctx.tools))
}

pub fn generate(ctx: &BuildContext) -> Result<(), ActionError> {
    let sel = &ctx.selection;
    ui::section(&format!("GENERATING PROJECT ({})", sel.configuration));

    let Some(cmd) = generate_command(ctx) else {
        println!("{} CMake not found!", "x".red());
        return Err(ActionError::MissingTool("CMake"));
    };

    let build_dir = ctx.layout.build_dir(sel);
    if !build_dir.exists() {
        fs::create_dir_all(&build_dir)
            .map_err(ActionError::io(format!("failed to create {}", build_dir.display())))?;
        println!("{} Created folder: {}", "✓".green(), sel.build_folder_name());
    }

    let env = compiler_environment(ctx);
    if let Err(e) = run_command(&cmd, ctx.layout.root(), env.as_ref()) {
        println!("\n{} Project generation failed", "x".red());
        return Err(e);
    }

    info!(folder = sel.build_folder_name(), "project generated");
    println!("\n{} Project generated: {}/", "✓".green(), sel.build_folder_name());
    println!("  Generator: {}", sel.cmake_generator());
    println!("  Configuration: {}", sel.configuration);
    println!("  Toolchain: {}", sel.toolchain);
    Ok(())
}

pub fn build(ctx: &BuildContext) -> Result<(), ActionError> {
    let sel = &ctx.selection;
    ui::section(&format!("BUILDING PROJECT ({})", sel.configuration));

    let build_dir = ctx.layout.build_dir(sel);
    if !build_dir.exists() {
        println!(
            "{} Build folder does not exist: {}",
            "x".red(),
            sel.build_folder_name()
        );
        println!("  Generate the project first!");
        return Err(ActionError::MissingBuildFolder(build_dir));
    }

    let Some(cmd) = compile_command(ctx) else {
        println!("{} CMake not found!", "x".red());
        return Err(ActionError::MissingTool("CMake"));
    };

    let env = compiler_environment(ctx);
    if let Err(e) = run_command(&cmd, ctx.layout.root(), env.as_ref()) {
        println!("\n{} Build failed", "x".red());
        return Err(e);
    }

    println!("\n{} Build succeeded!", "✓".green());
    println!("  Configuration: {}", sel.configuration);
    let exe = ctx.layout.executable_path(sel);
    if exe.exists() {
        println!("  Executable: {}", exe.display());
    }
    Ok(())
}

/// Clean, generate, build. A missing folder does not stop the rebuild.
pub fn rebuild(ctx: &BuildContext) -> Result<(), ActionError> {
    ui::section(&format!("REBUILDING PROJECT ({})", ctx.selection.configuration));

    match clean(ctx) {
        Ok(()) | Err(ActionError::MissingFolder(_)) => {}
        Err(e) => return Err(e),
    }
    generate(ctx)?;
    println!();
    build(ctx)
}

pub fn run(ctx: &BuildContext) -> Result<(), ActionError> {
    let exe = ctx.layout.executable_path(&ctx.selection);
    if !exe.exists() {
        println!("{} Executable not found: {}", "x".red(), exe.display());
        println!("  Build the project first!");
        return Err(ActionError::MissingExecutable(exe));
    }

    ui::section(&format!("RUNNING {}", ctx.selection.project_name));
    run_command(&CommandLine::new(&exe), ctx.layout.root(), None)
}

/// Generates `vs-build/<project>.sln` without changing the selection.
pub fn generate_vs_solution(ctx: &mut BuildContext) -> Result<PathBuf, ActionError> {
    let saved = ctx.selection.clone();
    ctx.selection.ide = Ide::VisualStudio;
    ctx.selection.build_system = BuildSystem::MSBuild;

    let result = generate(ctx);
    let solution = ctx
        .layout
        .build_dir(&ctx.selection)
        .join(format!("{}.sln", ctx.selection.project_name));
    ctx.selection = saved;

    result?;
    println!("{} Solution: {}", "✓".green(), solution.display());
    Ok(solution)
}

/// Opens a file with its associated application. Windows only.
pub fn open_solution(solution: &std::path::Path) -> Result<(), ActionError> {
    if !cfg!(windows) {
        println!(
            "{} Opening solutions is only supported on Windows",
            "!".yellow()
        );
        return Ok(());
    }
    let mut cmd = CommandLine::new("cmd");
    cmd.args(["/C", "start", ""]).arg(solution.to_string_lossy());
    let dir = solution.parent().unwrap_or(solution);
    run_command(&cmd, dir, None)
}
