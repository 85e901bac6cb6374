//! # huybuild CLI Entry Point
//!
//! Parses arguments with clap, builds the [`BuildContext`] and either runs a
//! single action or opens the interactive menu.
//!
//! Exit codes: `0` success, `1` failure or bad arguments, `130` interrupted.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::PathBuf;
use tracing::debug;

use huybuild::build::{self, ActionError};
use huybuild::checker;
use huybuild::config::{
    BuildSelection, BuildSystem, Configuration, Ide, Platform, ProjectLayout, Toolchain,
};
use huybuild::context::BuildContext;
use huybuild::logging;
use huybuild::menu;
use huybuild::ui;

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
    fn SetConsoleCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
        SetConsoleCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Action {
    /// Generate the CMake project
    Generate,
    /// Build the generated project
    Build,
    /// Clean, generate and build
    Rebuild,
    /// Delete the current build folder
    Clean,
    /// Delete every build folder
    CleanAll,
    /// Run the built executable
    Run,
    /// Format sources with clang-format
    Format,
    /// Show detected tools
    Tools,
    /// Open the interactive menu
    Menu,
}

#[derive(Parser, Debug)]
#[command(name = "huybuild")]
#[command(about = "HuyEngine build automation", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Action to perform
    #[arg(value_enum, default_value_t = Action::Menu, ignore_case = true)]
    action: Action,

    /// IDE the build folder is laid out for
    #[arg(short, long, value_enum, ignore_case = true)]
    ide: Option<Ide>,

    /// Build system CMake generates for
    #[arg(short, long, value_enum, ignore_case = true)]
    build_system: Option<BuildSystem>,

    /// Build configuration
    #[arg(short = 'c', long = "config", value_enum, ignore_case = true)]
    configuration: Option<Configuration>,

    /// Target platform
    #[arg(short, long, value_enum, ignore_case = true)]
    platform: Option<Platform>,

    /// Compiler toolchain
    #[arg(short, long, value_enum, ignore_case = true)]
    toolchain: Option<Toolchain>,

    /// Verbose build output and debug diagnostics
    #[arg(long)]
    verbose: bool,

    /// Build without --clean-first
    #[arg(long)]
    no_clean: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    /// Flags override whatever the state file and user defaults chose.
    fn apply_to(&self, sel: &mut BuildSelection) {
        if let Some(ide) = self.ide {
            sel.ide = ide;
        }
        if let Some(build_system) = self.build_system {
            sel.build_system = build_system;
        }
        if let Some(configuration) = self.configuration {
            sel.configuration = configuration;
        }
        if let Some(platform) = self.platform {
            sel.platform = platform;
        }
        if let Some(toolchain) = self.toolchain {
            sel.toolchain = toolchain;
        }
        if self.verbose {
            sel.verbose = true;
        }
        if self.no_clean {
            sel.clean_first = false;
        }
    }
}

/// `--root`, else the working directory. Started from inside `Automation/`,
/// the parent is used.
fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root);
    }
    let cwd = std::env::current_dir()?;
    if cwd.file_name().is_some_and(|name| name == "Automation")
        && let Some(parent) = cwd.parent()
    {
        return Ok(parent.to_path_buf());
    }
    Ok(cwd)
}

fn dispatch(action: Action, ctx: &mut BuildContext) -> Result<(), ActionError> {
    match action {
        Action::Generate => build::generate(ctx),
        Action::Build => build::build(ctx),
        Action::Rebuild => build::rebuild(ctx),
        Action::Clean => build::clean(ctx),
        Action::CleanAll => build::clean_all(ctx),
        Action::Run => build::run(ctx),
        Action::Format => checker::format_code(ctx),
        Action::Tools => {
            ui::print_tool_status(&ctx.tools);
            Ok(())
        }
        Action::Menu => Ok(()),
    }
}

fn run(cli: Cli) -> Result<i32> {
    let root = resolve_root(cli.root.clone())?;
    debug!(root = %root.display(), "project root");

    let mut ctx = BuildContext::bootstrap(ProjectLayout::new(root));
    cli.apply_to(&mut ctx.selection);

    if cli.action == Action::Menu {
        ctx.warn_missing_tools();
        return match menu::run_menu(&mut ctx) {
            Ok(()) => Ok(0),
            Err(e) if matches!(e.downcast_ref::<ActionError>(), Some(ActionError::Interrupted)) => {
                println!("\n\n{}", "Interrupted by user.".yellow());
                println!("{}\n", "Goodbye!".green());
                Ok(130)
            }
            Err(e) => Err(e),
        };
    }

    ui::print_configuration(&ctx);
    ctx.warn_missing_tools();
    println!();

    match dispatch(cli.action, &mut ctx) {
        Ok(()) => Ok(0),
        Err(e) => {
            println!("\n{} {}", "x".red(), e);
            Ok(e.exit_code())
        }
    }
}

fn main() {
    enable_windows_utf8_console();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    logging::init_tracing(cli.verbose);

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        return;
    }

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            println!("{} Critical error: {:#}", "x".red(), e);
            1
        }
    };
    std::process::exit(code);
}
