//! Source formatting with clang-format.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;
use walkdir::WalkDir;

use crate::build::ActionError;
use crate::context::BuildContext;

pub const SOURCE_EXTENSIONS: &[&str] = &["cpp", "h", "hpp", "c"];

/// How many collected files are listed before formatting.
const LISTED_FILES: usize = 15;

fn is_source(path: &Path) -> bool {
    path.extension()
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_string_lossy().as_ref()))
        .unwrap_or(false)
}

/// Source files under `root` for each entry of `dirs`.
///
/// An entry may name a single file or a directory, which is walked
/// recursively. Entries that do not exist are skipped.
pub fn collect_sources(root: &Path, dirs: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in dirs {
        let path = root.join(dir);
        if path.is_file() {
            if is_source(&path) {
                files.push(path);
            }
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(&path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_source(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            debug!(path = %path.display(), "source entry missing");
        }
    }
    files
}

fn clang_format_available() -> bool {
    Command::new("clang-format")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn format_code(ctx: &BuildContext) -> Result<(), ActionError> {
    crate::ui::section("CODE FORMATTING (CLANG-FORMAT)");

    let root = ctx.layout.root();
    let dirs = &ctx.options.source_dirs;
    let files = collect_sources(root, dirs);
    if files.is_empty() {
        println!("{} No files to format found in {:?}", "x".red(), dirs);
        return Err(ActionError::NoSources(dirs.clone()));
    }

    println!("Files found: {}", files.len());
    for file in files.iter().take(LISTED_FILES) {
        let shown = file.strip_prefix(root).unwrap_or(file);
        println!("  - {}", shown.display());
    }
    if files.len() > LISTED_FILES {
        println!("  ... and {} more", files.len() - LISTED_FILES);
    }
    println!();

    if !clang_format_available() {
        println!("{} clang-format not found in the system!", "x".red());
        println!("  Install clang-format and add it to PATH");
        return Err(ActionError::MissingTool("clang-format"));
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut failed = Vec::new();
    for path in &files {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        pb.set_message(name);

        let status = Command::new("clang-format")
            .arg("-i")
            .arg("--style=file")
            .arg(path)
            .current_dir(root)
            .status();
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => failed.push((path.clone(), s.code())),
            Err(e) => {
                pb.finish_and_clear();
                return Err(ActionError::Spawn {
                    program: "clang-format".to_string(),
                    source: e,
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some((_, code)) = failed.first() {
        for (path, _) in &failed {
            println!("{} {}", "x".red(), path.display());
        }
        println!("\n{} Formatting error", "x".red());
        return Err(ActionError::Failed {
            program: "clang-format".to_string(),
            code: *code,
        });
    }

    println!(
        "{} Formatting completed successfully! ({} files)",
        "✓".green(),
        files.len()
    );
    Ok(())
}
