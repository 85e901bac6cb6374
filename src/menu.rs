//! Interactive menu.
//!
//! Every choice prompt lists "0. Back" first and starts on the current value.
//! Esc behaves like Back; Ctrl-C leaves the menu as an interruption.

use anyhow::Result;
use colored::*;
use console::Term;
use inquire::error::InquireError;
use inquire::{Confirm, Select, Text};
use std::fmt::Display;

use crate::build::{self, ActionError};
use crate::checker;
use crate::config::{
    BuildSystem, Choice, Configuration, Ide, Platform, Toolchain, parse_cmake_version,
};
use crate::context::BuildContext;
use crate::ui;

const BACK: &str = "0. Back";

/// Outcome of a single prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Value(T),
    Back,
}

/// Maps Esc to `Back` and Ctrl-C to an interruption.
fn answered<T>(result: Result<T, InquireError>) -> Result<Answer<T>> {
    match result {
        Ok(value) => Ok(Answer::Value(value)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Back),
        Err(InquireError::OperationInterrupted) => Err(ActionError::Interrupted.into()),
        Err(e) => Err(e.into()),
    }
}

fn numbered<D: Display>(items: &[D]) -> Vec<String> {
    let mut options = vec![BACK.to_string()];
    options.extend(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item)),
    );
    options
}

/// Index into `items`, or `Back`.
fn pick<D: Display>(title: &str, items: &[D], current: Option<usize>) -> Result<Answer<usize>> {
    let options = numbered(items);
    let cursor = current.map(|i| i + 1).unwrap_or(1);
    let answer = answered(
        Select::new(title, options)
            .with_starting_cursor(cursor)
            .raw_prompt(),
    )?;
    Ok(match answer {
        Answer::Value(option) if option.index > 0 => Answer::Value(option.index - 1),
        _ => Answer::Back,
    })
}

fn select_choice<T: Choice + Display>(title: &str, current: T) -> Result<Answer<T>> {
    let all: Vec<T> = T::all().collect();
    let position = all.iter().position(|v| *v == current);
    Ok(match pick(title, &all, position)? {
        Answer::Value(i) => Answer::Value(all[i]),
        Answer::Back => Answer::Back,
    })
}

/// What a free-text answer means: keep, back, or a new value.
pub fn interpret_text(input: &str) -> Answer<Option<String>> {
    match input.trim() {
        "0" => Answer::Back,
        "" => Answer::Value(None),
        text => Answer::Value(Some(text.to_string())),
    }
}

fn ask_text(prompt: &str) -> Result<Answer<Option<String>>> {
    Ok(match answered(Text::new(prompt).prompt())? {
        Answer::Value(input) => interpret_text(&input),
        Answer::Back => Answer::Back,
    })
}

/// Positive integer or `None`.
pub fn parse_cxx_standard(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

fn pause() {
    println!("\n{}", "Press Enter to continue...".cyan());
    let _ = Term::stdout().read_line();
}

fn clear_screen() {
    let _ = Term::stdout().clear_screen();
}

fn header() {
    let rule = "=".repeat(70);
    println!("{}", rule.cyan().bold());
    let title = format!("{:^70}", "HuyEngine - Build Automation Menu");
    println!("{}", title.cyan().bold());
    println!("{}\n", rule.cyan().bold());
}

/// Interruptions propagate; other failures are reported and the menu goes on.
fn report(result: Result<(), ActionError>, success: &str) -> Result<()> {
    match result {
        Ok(()) => {
            println!("\n{} {}", "✓".green(), success);
            Ok(())
        }
        Err(ActionError::Interrupted) => Err(ActionError::Interrupted.into()),
        Err(e) => {
            println!("\n{} {}", "x".red(), e);
            Ok(())
        }
    }
}

/// Walks through every setting. Back at any step discards all edits.
fn configure(ctx: &mut BuildContext) -> Result<()> {
    clear_screen();
    header();
    println!("{}\n", "BUILD CONFIGURATION".bold());

    let mut draft = ctx.selection.clone();

    macro_rules! choose {
        ($ty:ty, $title:expr, $field:ident) => {
            match select_choice::<$ty>($title, draft.$field)? {
                Answer::Value(v) => draft.$field = v,
                Answer::Back => return Ok(()),
            }
        };
    }
    choose!(Ide, "Select IDE:", ide);
    choose!(BuildSystem, "Select build system:", build_system);
    choose!(Configuration, "Select configuration:", configuration);
    choose!(Platform, "Select platform:", platform);
    choose!(Toolchain, "Select toolchain (compiler):", toolchain);

    let prompt = format!("Project name (leave empty to keep '{}'):", draft.project_name);
    match ask_text(&prompt)? {
        Answer::Back => return Ok(()),
        Answer::Value(Some(name)) => draft.project_name = name,
        Answer::Value(None) => {}
    }

    let prompt = format!(
        "C++ standard (default {}, e.g. 17/20/23, or 0 to Back):",
        draft.cxx_standard
    );
    match ask_text(&prompt)? {
        Answer::Back => return Ok(()),
        Answer::Value(Some(text)) => match parse_cxx_standard(&text) {
            Some(standard) => draft.cxx_standard = standard,
            None => println!(
                "{} Invalid number, keeping {}.",
                "!".yellow(),
                draft.cxx_standard
            ),
        },
        Answer::Value(None) => {}
    }

    let prompt = format!(
        "CMake minimum required (default {}):",
        draft.cmake_minimum_version
    );
    match ask_text(&prompt)? {
        Answer::Back => return Ok(()),
        Answer::Value(Some(text)) => match parse_cmake_version(&text) {
            Some(version) => draft.cmake_minimum_version = version,
            None => println!(
                "{} Invalid version, keeping {}.",
                "!".yellow(),
                draft.cmake_minimum_version
            ),
        },
        Answer::Value(None) => {}
    }

    ctx.selection = draft;
    println!("\n{} Configuration updated!", "✓".green());
    if ctx.save_selection() {
        println!("{} Configuration saved.", "✓".green());
    } else {
        println!("{} Failed to save configuration.", "!".yellow());
    }
    ctx.warn_missing_tools();
    pause();
    Ok(())
}

fn vs_solution(ctx: &mut BuildContext) -> Result<()> {
    let solution = match build::generate_vs_solution(ctx) {
        Ok(path) => path,
        Err(ActionError::Interrupted) => return Err(ActionError::Interrupted.into()),
        Err(e) => {
            println!("\n{} Visual Studio solution generation failed: {}", "x".red(), e);
            return Ok(());
        }
    };

    let open = answered(
        Confirm::new("Open in Visual Studio?")
            .with_default(false)
            .prompt(),
    )?;
    if open == Answer::Value(true) {
        report(build::open_solution(&solution), "Visual Studio started")?;
    }
    Ok(())
}

const BUILD_ITEMS: &[&str] = &[
    "Generate (Project generation)",
    "Build (Build project)",
    "Rebuild (Rebuild project)",
    "Clean (Clean current folder)",
    "Clean All (Clean all build folders)",
    "Run (Run executable)",
    "Generate VS Solution (Quick)",
];

fn build_actions(ctx: &mut BuildContext) -> Result<()> {
    clear_screen();
    header();
    println!("{}\n", "BUILD ACTIONS".bold());

    let index = match pick("Select action:", BUILD_ITEMS, None)? {
        Answer::Value(i) => i,
        Answer::Back => return Ok(()),
    };
    println!();
    match index {
        0 => report(build::generate(ctx), "Project generated successfully!")?,
        1 => report(build::build(ctx), "Project built successfully!")?,
        2 => report(build::rebuild(ctx), "Project rebuilt successfully!")?,
        3 => report(build::clean(ctx), "Build folder deleted!")?,
        4 => report(build::clean_all(ctx), "All build folders deleted!")?,
        5 => report(build::run(ctx), "Application finished")?,
        _ => vs_solution(ctx)?,
    }
    pause();
    Ok(())
}

const TOOL_ITEMS: &[&str] = &[
    "Clang-Format (Format code)",
    "Refresh tool paths",
    "Show tool status",
];

fn tools(ctx: &mut BuildContext) -> Result<()> {
    clear_screen();
    header();
    println!("{}\n", "TOOLS".bold());

    let index = match pick("Select action:", TOOL_ITEMS, None)? {
        Answer::Value(i) => i,
        Answer::Back => return Ok(()),
    };
    match index {
        0 => report(checker::format_code(ctx), "Formatting completed!")?,
        1 => {
            ctx.refresh_tools();
            ui::print_tool_status(&ctx.tools);
            println!("\n{} Paths updated!", "✓".green());
        }
        _ => ui::print_tool_status(&ctx.tools),
    }
    pause();
    Ok(())
}

const MAIN_ITEMS: &[&str] = &["Configuration", "Build", "Tools"];

/// Runs until the user picks Exit. Interruptions are returned as errors.
pub fn run_menu(ctx: &mut BuildContext) -> Result<()> {
    loop {
        clear_screen();
        header();
        ui::print_configuration(ctx);
        println!();
        ui::print_tool_status(&ctx.tools);
        println!("\n{}\n", "MAIN MENU".bold());

        let options: Vec<String> = MAIN_ITEMS
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item))
            .chain(std::iter::once("0. Exit".to_string()))
            .collect();
        let choice = answered(Select::new("Select menu item:", options).raw_prompt())?;
        match choice {
            Answer::Value(option) if option.index == 0 => configure(ctx)?,
            Answer::Value(option) if option.index == 1 => build_actions(ctx)?,
            Answer::Value(option) if option.index == 2 => tools(ctx)?,
            _ => {
                println!("\n{}\n", "Goodbye!".green());
                return Ok(());
            }
        }
    }
}
