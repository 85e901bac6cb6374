//! Build folder cleanup.
//!
//! - `huybuild clean` removes the folder of the current selection
//! - `huybuild clean-all` removes every folder any selection can produce

use colored::*;
use std::fs;
use std::path::Path;

use super::error::ActionError;
use crate::config::BUILD_FOLDERS;
use crate::context::BuildContext;

/// Deletes `root/<folder>`. A missing folder is an error.
pub fn clean_build_folder(root: &Path, folder: &str) -> Result<(), ActionError> {
    let path = root.join(folder);
    if !path.exists() {
        println!("{} Folder {} does not exist", "!".yellow(), folder);
        return Err(ActionError::MissingFolder(path));
    }

    match fs::remove_dir_all(&path) {
        Ok(()) => {
            println!("{} Folder deleted: {}", "✓".green(), folder);
            Ok(())
        }
        Err(e) => {
            println!("{} Error deleting {}: {}", "x".red(), folder, e);
            Err(ActionError::io(format!("failed to delete {}", folder))(e))
        }
    }
}

pub fn clean(ctx: &BuildContext) -> Result<(), ActionError> {
    clean_build_folder(ctx.layout.root(), ctx.selection.build_folder_name())
}

/// Tries every known folder. Always succeeds; each folder is reported.
pub fn clean_all(ctx: &BuildContext) -> Result<(), ActionError> {
    let mut removed = 0;
    for folder in BUILD_FOLDERS {
        if clean_build_folder(ctx.layout.root(), folder).is_ok() {
            removed += 1;
        }
    }
    println!(
        "{} Clean complete ({} of {} folders removed)",
        "✓".green(),
        removed,
        BUILD_FOLDERS.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildSelection, ProjectLayout};
    use crate::toolchain::ToolPaths;

    fn ctx(root: &Path) -> BuildContext {
        BuildContext::new(
            ProjectLayout::new(root),
            BuildSelection::default(),
            ToolPaths::default(),
        )
    }

    #[test]
    fn test_clean_missing_folder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = clean(&ctx(dir.path())).unwrap_err();
        assert!(matches!(err, ActionError::MissingFolder(_)));
    }

    #[test]
    fn test_clean_removes_current_folder_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("build-msvc").join("bin")).unwrap();
        fs::create_dir_all(dir.path().join("vs-build")).unwrap();

        clean(&ctx(dir.path())).unwrap();
        assert!(!dir.path().join("build-msvc").exists());
        assert!(dir.path().join("vs-build").exists());
    }

    #[test]
    fn test_clean_all_succeeds_with_partial_set() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cmake-build-debug")).unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::create_dir_all(dir.path().join("Engine")).unwrap();

        clean_all(&ctx(dir.path())).unwrap();
        assert!(!dir.path().join("cmake-build-debug").exists());
        assert!(!dir.path().join("build").exists());
        assert!(dir.path().join("Engine").exists());
    }
}
